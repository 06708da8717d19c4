//! Match patterns
//!
//! Keyword searches are compiled into a single alternation:
//! - every keyword is escaped literally
//! - `whole_word` wraps the whole alternation in `\b(?:...)\b`
//! - matching is case-insensitive unless `case_sensitive` is set
//!
//! Compiled keyword patterns are kept in a small LRU cache so repeated
//! searches (typing, paging back and forth) skip regex compilation.

use std::num::NonZeroUsize;

use lru::LruCache;
use regex::{Regex, RegexBuilder};

use super::config::HighlightOptions;
use crate::error::{HighlightError, Result};

/// Compiled keyword patterns to keep around
const PATTERN_CACHE_SIZE: usize = 32;

// =============================================================================
// Keyword normalization
// =============================================================================

/// Anything that can be searched for: one keyword or a list of them
pub trait IntoKeywords {
    /// Trimmed, non-blank keywords in their original order
    fn into_keywords(self) -> Vec<String>;
}

fn normalize<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl IntoKeywords for &str {
    fn into_keywords(self) -> Vec<String> {
        normalize([self])
    }
}

impl IntoKeywords for String {
    fn into_keywords(self) -> Vec<String> {
        normalize([self])
    }
}

impl IntoKeywords for &String {
    fn into_keywords(self) -> Vec<String> {
        normalize([self])
    }
}

impl<S: AsRef<str>> IntoKeywords for Vec<S> {
    fn into_keywords(self) -> Vec<String> {
        normalize(self)
    }
}

impl<S: AsRef<str>> IntoKeywords for &[S] {
    fn into_keywords(self) -> Vec<String> {
        normalize(self)
    }
}

impl<S: AsRef<str>, const N: usize> IntoKeywords for [S; N] {
    fn into_keywords(self) -> Vec<String> {
        normalize(self)
    }
}

// =============================================================================
// Pattern building
// =============================================================================

/// Escape regex metacharacters so the keyword matches literally
#[inline]
pub fn escape_literal(keyword: &str) -> String {
    regex::escape(keyword)
}

/// Combined source for a keyword list (without case flags)
pub fn build_source(keywords: &[String], whole_word: bool) -> String {
    let alternation = keywords
        .iter()
        .map(|k| escape_literal(k))
        .collect::<Vec<_>>()
        .join("|");
    if whole_word {
        format!(r"\b(?:{alternation})\b")
    } else {
        alternation
    }
}

/// Compile a keyword list with the given options
pub fn compile_keywords(keywords: &[String], options: HighlightOptions) -> Result<Regex> {
    let regex = RegexBuilder::new(&build_source(keywords, options.whole_word))
        .case_insensitive(!options.case_sensitive)
        .build()?;
    Ok(regex)
}

/// A caller-supplied pattern
///
/// Flags follow the familiar letter convention: `g` match all occurrences,
/// `i` case-insensitive, `m` multi-line, `s` dot matches newline,
/// `x` ignore whitespace, `u` accepted (matching is always Unicode-aware).
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
    flags: String,
    global: bool,
}

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Result<Self> {
        let mut builder = RegexBuilder::new(source);
        let mut global = false;
        let mut seen = String::with_capacity(flags.len());

        for flag in flags.chars() {
            if seen.contains(flag) {
                return Err(HighlightError::InvalidPattern(format!(
                    "duplicate flag '{flag}'"
                )));
            }
            seen.push(flag);
            match flag {
                'g' => global = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'u' => {}
                other => {
                    return Err(HighlightError::InvalidPattern(format!(
                        "unknown flag '{other}'"
                    )))
                }
            }
        }

        Ok(Pattern {
            regex: builder.build()?,
            source: source.to_string(),
            flags: seen,
            global,
        })
    }

    /// Wrap an already compiled regex
    pub fn from_regex(regex: Regex, global: bool) -> Self {
        Pattern {
            source: regex.as_str().to_string(),
            flags: if global { "g".to_string() } else { String::new() },
            regex,
            global,
        }
    }

    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Whether the pattern matches every occurrence, not just the first
    #[inline]
    pub fn is_global(&self) -> bool {
        self.global
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

// =============================================================================
// Cache
// =============================================================================

type CacheKey = (Vec<String>, bool, bool);

/// LRU cache of compiled keyword patterns
pub struct PatternCache {
    cache: LruCache<CacheKey, Regex>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternCache {
    pub fn new() -> Self {
        Self::with_capacity(PATTERN_CACHE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PatternCache {
            cache: LruCache::new(capacity),
        }
    }

    /// Get a compiled pattern, compiling and caching on miss
    ///
    /// `Regex` clones share the compiled program, so handing out a clone
    /// is cheap.
    pub fn get_or_compile(&mut self, keywords: &[String], options: HighlightOptions) -> Result<Regex> {
        let key = (keywords.to_vec(), options.case_sensitive, options.whole_word);
        if let Some(regex) = self.cache.get(&key) {
            return Ok(regex.clone());
        }
        let regex = compile_keywords(keywords, options)?;
        log::trace!("compiled keyword pattern {:?}", regex.as_str());
        self.cache.put(key, regex.clone());
        Ok(regex)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_keywords_normalizes() {
        assert_eq!("  JavaScript ".into_keywords(), vec!["JavaScript"]);
        assert!("   ".into_keywords().is_empty());
        assert_eq!(
            vec!["a", " ", "", " b "].into_keywords(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(["x", "y"].into_keywords().len(), 2);
    }

    #[test]
    fn test_escape_special_characters() {
        let regex = compile_keywords(&["$100.50".to_string()], HighlightOptions::default()).unwrap();
        assert!(regex.is_match("Price: $100.50 and"));
        assert!(!regex.is_match("Price: $100x50"));
    }

    #[test]
    fn test_whole_word_wraps_alternation() {
        let source = build_source(&["a".into(), "b".into()], true);
        assert_eq!(source, r"\b(?:a|b)\b");
        assert_eq!(build_source(&["a.b".into()], false), r"a\.b");
    }

    #[test]
    fn test_case_sensitivity() {
        let keywords = vec!["javascript".to_string()];
        let insensitive = compile_keywords(&keywords, HighlightOptions::default()).unwrap();
        assert!(insensitive.is_match("JavaScript"));
        let sensitive =
            compile_keywords(&keywords, HighlightOptions::default().case_sensitive(true)).unwrap();
        assert!(!sensitive.is_match("JavaScript"));
    }

    #[test]
    fn test_pattern_flags() {
        let pattern = Pattern::new(r"\d+", "gi").unwrap();
        assert!(pattern.is_global());
        assert_eq!(pattern.flags(), "gi");
        assert_eq!(pattern.to_string(), r"/\d+/gi");

        let pattern = Pattern::new("abc", "i").unwrap();
        assert!(!pattern.is_global());
        assert!(pattern.regex().is_match("ABC"));
    }

    #[test]
    fn test_pattern_from_regex() {
        let pattern = Pattern::from_regex(Regex::new("a+").unwrap(), true);
        assert!(pattern.is_global());
        assert_eq!(pattern.to_string(), "/a+/g");
    }

    #[test]
    fn test_pattern_rejects_bad_flags() {
        assert!(matches!(
            Pattern::new("a", "gq"),
            Err(HighlightError::InvalidPattern(_))
        ));
        assert!(matches!(
            Pattern::new("a", "gg"),
            Err(HighlightError::InvalidPattern(_))
        ));
        assert!(matches!(
            Pattern::new("(", "g"),
            Err(HighlightError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_cache_reuses_compiled() {
        let mut cache = PatternCache::with_capacity(2);
        let kw = vec!["a".to_string()];
        cache.get_or_compile(&kw, HighlightOptions::default()).unwrap();
        cache.get_or_compile(&kw, HighlightOptions::default()).unwrap();
        assert_eq!(cache.len(), 1);
        cache
            .get_or_compile(&kw, HighlightOptions::default().whole_word(true))
            .unwrap();
        cache.get_or_compile(&["b".to_string()], HighlightOptions::default()).unwrap();
        assert_eq!(cache.len(), 2);
    }
}
