//! Highlighter configuration
//!
//! `HighlighterConfig` is read from TOML with every field optional:
//!
//! ```toml
//! highlight_tag = "span"
//! skip_tags = ["script", "style", "pre"]
//!
//! [scroll_behavior]
//! block = "start"
//! ```
//!
//! A config is never mutated in place. `merged` builds a new one from a
//! `ConfigPatch`.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How the scroll animates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    Auto,
    #[default]
    Smooth,
    Instant,
}

/// Where the target lands in the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAlign {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollBehavior {
    pub behavior: ScrollMode,
    pub block: ScrollAlign,
    pub inline: ScrollAlign,
}

impl Default for ScrollBehavior {
    fn default() -> Self {
        ScrollBehavior {
            behavior: ScrollMode::Smooth,
            block: ScrollAlign::Center,
            inline: ScrollAlign::Nearest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Tag of the element wrapping each match
    pub highlight_tag: String,
    /// Class carried by every wrapper
    pub highlight_class: String,
    /// Class carried by the current wrapper only
    pub active_class: String,
    /// Text below any of these elements is never matched
    pub skip_tags: Vec<String>,
    pub scroll_behavior: ScrollBehavior,
    /// Yield to the scheduler between batches in the async path
    pub enable_performance_optimization: bool,
    /// Text leaves visited per batch
    pub batch_size: usize,
    /// Skip scrolling when the target is already comfortably visible
    pub smart_scroll: bool,
    /// Margin in pixels defining "comfortably visible"
    pub scroll_padding: f64,
    /// Leaf count from which the sync path plans fragments in parallel (0 = never)
    pub parallel_threshold: usize,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        HighlighterConfig {
            highlight_tag: "mark".to_string(),
            highlight_class: "highlight".to_string(),
            active_class: "highlight-active".to_string(),
            skip_tags: vec!["script".into(), "style".into(), "noscript".into()],
            scroll_behavior: ScrollBehavior::default(),
            enable_performance_optimization: true,
            batch_size: 100,
            smart_scroll: true,
            scroll_padding: 100.0,
            parallel_threshold: 2048,
        }
    }
}

impl HighlighterConfig {
    /// Parse a (possibly partial) TOML document over the defaults
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: HighlighterConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    /// Replace values that would make the highlighter misbehave
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.batch_size == 0 {
            log::warn!("batch_size must be at least 1, using {}", defaults.batch_size);
            self.batch_size = defaults.batch_size;
        }
        if self.highlight_tag.trim().is_empty() {
            log::warn!("highlight_tag is blank, using {:?}", defaults.highlight_tag);
            self.highlight_tag = defaults.highlight_tag;
        }
        if self.highlight_class.trim().is_empty() {
            log::warn!("highlight_class is blank, using {:?}", defaults.highlight_class);
            self.highlight_class = defaults.highlight_class;
        }
        if !self.scroll_padding.is_finite() || self.scroll_padding < 0.0 {
            log::warn!("scroll_padding must be a non-negative number, using {}", defaults.scroll_padding);
            self.scroll_padding = defaults.scroll_padding;
        }
        self
    }

    /// Build a new config with the fields present in `patch` replaced
    pub fn merged(&self, patch: ConfigPatch) -> Self {
        HighlighterConfig {
            highlight_tag: patch.highlight_tag.unwrap_or_else(|| self.highlight_tag.clone()),
            highlight_class: patch
                .highlight_class
                .unwrap_or_else(|| self.highlight_class.clone()),
            active_class: patch.active_class.unwrap_or_else(|| self.active_class.clone()),
            skip_tags: patch.skip_tags.unwrap_or_else(|| self.skip_tags.clone()),
            scroll_behavior: patch.scroll_behavior.unwrap_or(self.scroll_behavior),
            enable_performance_optimization: patch
                .enable_performance_optimization
                .unwrap_or(self.enable_performance_optimization),
            batch_size: patch.batch_size.unwrap_or(self.batch_size),
            smart_scroll: patch.smart_scroll.unwrap_or(self.smart_scroll),
            scroll_padding: patch.scroll_padding.unwrap_or(self.scroll_padding),
            parallel_threshold: patch.parallel_threshold.unwrap_or(self.parallel_threshold),
        }
        .sanitized()
    }

    /// Whether `tag` is one of the skipped tags (ASCII case-insensitive)
    pub fn is_skip_tag(&self, tag: &str) -> bool {
        self.skip_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Partial update for [`HighlighterConfig::merged`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub highlight_tag: Option<String>,
    pub highlight_class: Option<String>,
    pub active_class: Option<String>,
    pub skip_tags: Option<Vec<String>>,
    pub scroll_behavior: Option<ScrollBehavior>,
    pub enable_performance_optimization: Option<bool>,
    pub batch_size: Option<usize>,
    pub smart_scroll: Option<bool>,
    pub scroll_padding: Option<f64>,
    pub parallel_threshold: Option<usize>,
}

/// Per-call matching options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HighlightOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl HighlightOptions {
    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    pub fn whole_word(mut self, yes: bool) -> Self {
        self.whole_word = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;

    #[test]
    fn test_defaults() {
        let config = HighlighterConfig::default();
        assert_eq!(config.highlight_tag, "mark");
        assert_eq!(config.highlight_class, "highlight");
        assert_eq!(config.active_class, "highlight-active");
        assert!(config.is_skip_tag("SCRIPT"));
        assert!(config.is_skip_tag("noscript"));
        assert!(!config.is_skip_tag("p"));
        assert_eq!(config.scroll_behavior.block, ScrollAlign::Center);
        assert_eq!(config.scroll_behavior.inline, ScrollAlign::Nearest);
        assert_eq!(config.scroll_padding, 100.0);
    }

    #[test]
    fn test_partial_toml() {
        let config = HighlighterConfig::from_toml(
            r#"
            highlight_tag = "span"
            smart_scroll = false

            [scroll_behavior]
            block = "start"
            "#,
        )
        .unwrap();
        assert_eq!(config.highlight_tag, "span");
        assert!(!config.smart_scroll);
        assert_eq!(config.scroll_behavior.block, ScrollAlign::Start);
        assert_eq!(config.scroll_behavior.behavior, ScrollMode::Smooth);
        assert_eq!(config.highlight_class, "highlight");
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_bad_toml() {
        let err = HighlighterConfig::from_toml("batch_size = \"many\"").unwrap_err();
        assert!(matches!(err, HighlightError::Config(_)));
    }

    #[test]
    fn test_sanitized_batch_size() {
        let config = HighlighterConfig::from_toml("batch_size = 0").unwrap();
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_merged_produces_new_config() {
        let base = HighlighterConfig::default();
        let patch = ConfigPatch {
            active_class: Some("current".into()),
            batch_size: Some(10),
            ..Default::default()
        };
        let merged = base.merged(patch);
        assert_eq!(merged.active_class, "current");
        assert_eq!(merged.batch_size, 10);
        assert_eq!(merged.highlight_tag, "mark");
        assert_eq!(base.active_class, "highlight-active");
    }
}
