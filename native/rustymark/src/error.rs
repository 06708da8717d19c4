//! Error types
//!
//! Only construction, custom patterns and config loading can fail.
//! Everything else reports "nothing happened" through its return value.

use thiserror::Error;

use crate::dom::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("root node {0} is missing or not an element")]
    InvalidRoot(NodeId),
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<regex::Error> for HighlightError {
    fn from(err: regex::Error) -> Self {
        HighlightError::InvalidPattern(err.to_string())
    }
}

impl From<toml::de::Error> for HighlightError {
    fn from(err: toml::de::Error) -> Self {
        HighlightError::Config(err.message().to_string())
    }
}

pub type Result<T> = std::result::Result<T, HighlightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            HighlightError::InvalidRoot(7).to_string(),
            "root node 7 is missing or not an element"
        );
        assert_eq!(
            HighlightError::InvalidPattern("not global".into()).to_string(),
            "invalid pattern: not global"
        );
    }

    #[test]
    fn test_from_regex_error() {
        let err: HighlightError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, HighlightError::InvalidPattern(_)));
    }
}
