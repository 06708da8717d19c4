//! ResourceArc Wrappers
//!
//! Persistent highlighter state held by the BEAM between calls.

use crate::dom::Document;
use crate::error::Result;
use crate::highlight::{Callbacks, Highlighter, HighlighterConfig, LineLayout, NoYield};
use rustler::ResourceArc;
use std::sync::Mutex;

/// Highlighter over a parsed fragment, with line geometry and no yielding
pub type NifHighlighter = Highlighter<Document, LineLayout, NoYield>;

/// Wrapper for a Highlighter that can be stored in a ResourceArc
pub struct HighlighterResource {
    pub inner: Mutex<NifHighlighter>,
}

impl HighlighterResource {
    /// Parse the markup ONCE and bind a highlighter to its container
    pub fn new(markup: &[u8], config: HighlighterConfig) -> Result<Self> {
        let (doc, body) = Document::parse_fragment(markup);
        let highlighter = Highlighter::new(doc, body, config, Callbacks::default())?
            .with_viewport(LineLayout::default())
            .with_scheduler(NoYield);
        Ok(HighlighterResource {
            inner: Mutex::new(highlighter),
        })
    }

    /// Run `f` with exclusive access to the highlighter.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the highlighter mutex is poisoned.
    pub fn with<F, R>(&self, f: F) -> std::result::Result<R, &'static str>
    where
        F: FnOnce(&mut NifHighlighter) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for HighlighterResource {}

/// Type alias for the ResourceArc
pub type HighlighterRef = ResourceArc<HighlighterResource>;
