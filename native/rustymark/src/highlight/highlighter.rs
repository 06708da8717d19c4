//! The Highlighter
//!
//! Bound to one root element for its whole life. Each apply clears the
//! previous highlighting, walks the text leaves under the root in document
//! order, plans a replacement fragment for every leaf that matches and only
//! then mutates the tree. Navigation moves a single "active" marker over the
//! resulting wrappers.
//!
//! States are "empty" (`current == None`, no highlights) and "positioned at
//! i" (`current == Some(i)`, `i < highlights.len()`).

use regex::Regex;

use super::callbacks::Callbacks;
use super::config::{ConfigPatch, HighlightOptions, HighlighterConfig};
use super::fragment::{materialize, plan_leaf, FragmentPlan};
use super::pattern::{IntoKeywords, Pattern, PatternCache};
use super::scheduler::{Scheduler, TaskYield};
use super::viewport::{is_comfortably_visible, NoViewport, Viewport};
use crate::dom::{NodeId, TextTree};
use crate::error::{HighlightError, Result};
use crate::strategy::{plan_parallel, plan_sequential};

pub struct Highlighter<T: TextTree, V: Viewport = NoViewport, S: Scheduler = TaskYield> {
    tree: T,
    root: NodeId,
    config: HighlighterConfig,
    callbacks: Callbacks,
    viewport: V,
    scheduler: S,
    patterns: PatternCache,
    /// Wrappers in document order
    highlights: Vec<NodeId>,
    current: Option<usize>,
    current_keywords: Vec<String>,
    current_pattern: Option<Pattern>,
}

impl<T: TextTree> Highlighter<T> {
    /// Bind a highlighter to `root`, which must be an element of `tree`
    pub fn new(tree: T, root: NodeId, config: HighlighterConfig, callbacks: Callbacks) -> Result<Self> {
        if !tree.is_element(root) {
            return Err(HighlightError::InvalidRoot(root));
        }
        Ok(Highlighter {
            tree,
            root,
            config: config.sanitized(),
            callbacks,
            viewport: NoViewport,
            scheduler: TaskYield,
            patterns: PatternCache::new(),
            highlights: Vec::new(),
            current: None,
            current_keywords: Vec::new(),
            current_pattern: None,
        })
    }
}

impl<T: TextTree, V: Viewport, S: Scheduler> Highlighter<T, V, S> {
    /// Swap the geometry provider
    pub fn with_viewport<V2: Viewport>(self, mut viewport: V2) -> Highlighter<T, V2, S> {
        viewport.relayout(&self.tree, self.root);
        Highlighter {
            tree: self.tree,
            root: self.root,
            config: self.config,
            callbacks: self.callbacks,
            viewport,
            scheduler: self.scheduler,
            patterns: self.patterns,
            highlights: self.highlights,
            current: self.current,
            current_keywords: self.current_keywords,
            current_pattern: self.current_pattern,
        }
    }

    /// Swap the yield point used between batches
    pub fn with_scheduler<S2: Scheduler>(self, scheduler: S2) -> Highlighter<T, V, S2> {
        Highlighter {
            tree: self.tree,
            root: self.root,
            config: self.config,
            callbacks: self.callbacks,
            viewport: self.viewport,
            scheduler,
            patterns: self.patterns,
            highlights: self.highlights,
            current: self.current,
            current_keywords: self.current_keywords,
            current_pattern: self.current_pattern,
        }
    }

    // =========================================================================
    // Apply
    // =========================================================================

    /// Highlight every occurrence of the keywords, yielding between batches
    ///
    /// Returns the number of matches. Blank keyword lists match nothing.
    pub async fn apply(&mut self, keywords: impl IntoKeywords, options: HighlightOptions) -> usize {
        let keywords = keywords.into_keywords();
        let Some(regex) = self.prepare_keywords(&keywords, options) else {
            return 0;
        };
        let plans = if self.config.enable_performance_optimization {
            self.plan_batched(&regex).await
        } else {
            self.plan_all(&regex, false)
        };
        self.finish(plans, keywords, None)
    }

    /// Like [`apply`](Self::apply), without ever yielding
    pub fn apply_sync(&mut self, keywords: impl IntoKeywords, options: HighlightOptions) -> usize {
        let keywords = keywords.into_keywords();
        let Some(regex) = self.prepare_keywords(&keywords, options) else {
            return 0;
        };
        let plans = self.plan_all(&regex, true);
        self.finish(plans, keywords, None)
    }

    /// Highlight every match of a caller-supplied pattern
    ///
    /// The pattern must carry the global flag.
    pub async fn apply_regex(&mut self, pattern: Pattern) -> Result<usize> {
        check_global(&pattern)?;
        self.clear_highlights();
        let regex = pattern.regex().clone();
        let plans = if self.config.enable_performance_optimization {
            self.plan_batched(&regex).await
        } else {
            self.plan_all(&regex, false)
        };
        Ok(self.finish(plans, Vec::new(), Some(pattern)))
    }

    /// Like [`apply_regex`](Self::apply_regex), without ever yielding
    pub fn apply_regex_sync(&mut self, pattern: Pattern) -> Result<usize> {
        check_global(&pattern)?;
        self.clear_highlights();
        let regex = pattern.regex().clone();
        let plans = self.plan_all(&regex, true);
        Ok(self.finish(plans, Vec::new(), Some(pattern)))
    }

    /// Clear the previous run and compile the keyword pattern
    fn prepare_keywords(&mut self, keywords: &[String], options: HighlightOptions) -> Option<Regex> {
        self.clear_highlights();
        if keywords.is_empty() {
            log::debug!("no keywords to highlight");
            return None;
        }
        match self.patterns.get_or_compile(keywords, options) {
            Ok(regex) => Some(regex),
            Err(err) => {
                log::warn!("could not build pattern for {keywords:?}: {err}");
                None
            }
        }
    }

    /// Text leaves under the root that may be matched
    fn eligible_leaves(&self) -> Vec<NodeId> {
        self.tree
            .text_leaves(self.root)
            .into_iter()
            .filter(|&leaf| !self.is_excluded(leaf))
            .collect()
    }

    /// Whether any ancestor up to the root is a skipped tag or carries the
    /// highlight class, whatever its tag
    fn is_excluded(&self, leaf: NodeId) -> bool {
        let mut current = self.tree.parent(leaf);
        while let Some(id) = current {
            if let Some(tag) = self.tree.tag_name(id) {
                if self.config.is_skip_tag(tag) || self.tree.has_class(id, &self.config.highlight_class) {
                    return true;
                }
            }
            if id == self.root {
                break;
            }
            current = self.tree.parent(id);
        }
        false
    }

    /// Plan leaf by leaf, yielding to the scheduler between batches
    ///
    /// Batches count every visited leaf, excluded ones included.
    async fn plan_batched(&mut self, regex: &Regex) -> Vec<FragmentPlan> {
        let leaves = self.tree.text_leaves(self.root);
        let batch_size = self.config.batch_size.max(1);
        let mut plans = Vec::new();
        let mut batches = leaves.chunks(batch_size).peekable();
        let mut batch_index = 0;

        while let Some(batch) = batches.next() {
            plans.extend(batch.iter().filter_map(|&leaf| {
                if self.is_excluded(leaf) {
                    return None;
                }
                let text = self.tree.text(leaf)?;
                plan_leaf(leaf, text, regex)
            }));
            if batches.peek().is_some() {
                batch_index += 1;
                log::trace!("yielding after batch {batch_index} ({} plans so far)", plans.len());
                self.scheduler.yield_now().await;
            }
        }
        plans
    }

    /// Plan every leaf at once, in parallel for large documents when allowed
    fn plan_all(&self, regex: &Regex, allow_parallel: bool) -> Vec<FragmentPlan> {
        let leaves: Vec<(NodeId, &str)> = self
            .eligible_leaves()
            .into_iter()
            .filter_map(|leaf| self.tree.text(leaf).map(|text| (leaf, text)))
            .collect();

        let threshold = self.config.parallel_threshold;
        if allow_parallel && threshold > 0 && leaves.len() >= threshold {
            log::trace!("planning {} leaves in parallel", leaves.len());
            plan_parallel(&leaves, regex)
        } else {
            plan_sequential(&leaves, regex)
        }
    }

    /// Apply the planned replacements and enter the populated state
    fn finish(&mut self, plans: Vec<FragmentPlan>, keywords: Vec<String>, pattern: Option<Pattern>) -> usize {
        let mut highlights = Vec::with_capacity(plans.iter().map(FragmentPlan::match_count).sum());
        for plan in &plans {
            highlights.extend(materialize(
                &mut self.tree,
                plan,
                &self.config.highlight_tag,
                &self.config.highlight_class,
            ));
        }
        self.highlights = highlights;
        if !plans.is_empty() {
            self.viewport.relayout(&self.tree, self.root);
        }

        let count = self.highlights.len();
        log::debug!("highlighted {count} matches in {} text nodes", plans.len());
        if count > 0 {
            self.current = Some(0);
            self.activate();
        }

        self.current_keywords = keywords;
        self.current_pattern = pattern;
        self.callbacks.fire_applied(count, &self.current_keywords);
        count
    }

    // =========================================================================
    // Remove
    // =========================================================================

    /// Unwrap every highlight under the root and reset to the empty state
    pub fn remove(&mut self) {
        let removed = self.clear_highlights();
        log::debug!("removed {removed} highlights");
        self.callbacks.fire_removed();
    }

    /// Remove without notifying; returns the number of unwrapped elements
    fn clear_highlights(&mut self) -> usize {
        // Query fresh: the cached list may be stale if the tree was edited
        let wrappers = self.tree.query_elements(
            self.root,
            &self.config.highlight_tag,
            &self.config.highlight_class,
        );

        let mut parents = Vec::new();
        let mut removed = 0;
        for wrapper in wrappers {
            if !self.tree.contains(self.root, wrapper) {
                continue;
            }
            let Some(parent) = self.tree.parent(wrapper) else {
                continue;
            };
            let text = self.tree.text_content(wrapper);
            if text.is_empty() {
                self.tree.replace_with(wrapper, &[]);
            } else {
                let replacement = self.tree.create_text(&text);
                self.tree.replace_with(wrapper, &[replacement]);
            }
            if !parents.contains(&parent) {
                parents.push(parent);
            }
            removed += 1;
        }

        for parent in parents {
            self.tree.normalize(parent);
        }
        if removed > 0 {
            self.viewport.relayout(&self.tree, self.root);
        }

        self.highlights.clear();
        self.current = None;
        self.current_keywords.clear();
        self.current_pattern = None;
        removed
    }

    /// Remove everything and drop the callbacks; safe to call repeatedly
    pub fn destroy(&mut self) {
        self.remove();
        self.callbacks = Callbacks::default();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move to the next highlight, wrapping around
    pub fn next(&mut self) -> bool {
        let len = self.highlights.len();
        if len == 0 {
            return false;
        }
        let index = self.current.map_or(0, |i| (i + 1) % len);
        self.current = Some(index);
        self.activate();
        true
    }

    /// Move to the previous highlight, wrapping around
    pub fn previous(&mut self) -> bool {
        let len = self.highlights.len();
        if len == 0 {
            return false;
        }
        let index = self.current.map_or(0, |i| (i + len - 1) % len);
        self.current = Some(index);
        self.activate();
        true
    }

    /// Move to highlight `index`; false if out of range
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.highlights.len() {
            return false;
        }
        self.current = Some(index);
        self.activate();
        true
    }

    /// First highlight after the current one (wrapping) outside the comfortable viewport
    pub fn find_next_offscreen_index(&self) -> Option<usize> {
        let len = self.highlights.len();
        let current = self.current?;
        if len <= 1 {
            return None;
        }
        (1..len)
            .map(|step| (current + step) % len)
            .find(|&i| !self.is_comfortably_visible(self.highlights[i]))
    }

    /// First highlight before the current one (wrapping) outside the comfortable viewport
    pub fn find_previous_offscreen_index(&self) -> Option<usize> {
        let len = self.highlights.len();
        let current = self.current?;
        if len <= 1 {
            return None;
        }
        (1..len)
            .map(|step| (current + len - step) % len)
            .find(|&i| !self.is_comfortably_visible(self.highlights[i]))
    }

    /// Jump to the next offscreen highlight, or just the next one
    pub fn jump_to_next_offscreen(&mut self) -> bool {
        match self.find_next_offscreen_index() {
            Some(index) => self.jump_to(index),
            None => self.next(),
        }
    }

    /// Jump to the previous offscreen highlight, or just the previous one
    pub fn jump_to_previous_offscreen(&mut self) -> bool {
        match self.find_previous_offscreen_index() {
            Some(index) => self.jump_to(index),
            None => self.previous(),
        }
    }

    fn is_comfortably_visible(&self, node: NodeId) -> bool {
        is_comfortably_visible(
            self.viewport.bounding_box(node),
            self.viewport.viewport_height(),
            self.config.scroll_padding,
        )
    }

    /// Mark the current highlight active, scroll to it if needed, notify
    fn activate(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        let Some(&element) = self.highlights.get(index) else {
            return;
        };

        for &highlight in &self.highlights {
            self.tree.remove_class(highlight, &self.config.active_class);
        }
        self.tree.add_class(element, &self.config.active_class);

        if self.config.smart_scroll && self.is_comfortably_visible(element) {
            log::trace!("highlight {index} already visible, not scrolling");
        } else {
            self.viewport.scroll_into_view(element, &self.config.scroll_behavior);
        }

        self.callbacks
            .fire_navigate(index, self.highlights.len(), element);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn match_count(&self) -> usize {
        self.highlights.len()
    }

    /// Index of the active highlight, None when there are no highlights
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_keywords(&self) -> &[String] {
        &self.current_keywords
    }

    pub fn current_pattern(&self) -> Option<&Pattern> {
        self.current_pattern.as_ref()
    }

    pub fn current_element(&self) -> Option<NodeId> {
        self.current.and_then(|i| self.highlights.get(i).copied())
    }

    /// Copy of the wrapper list, in document order
    pub fn all_highlights(&self) -> Vec<NodeId> {
        self.highlights.clone()
    }

    /// Text of each wrapper, in document order
    pub fn highlight_texts(&self) -> Vec<String> {
        self.highlights
            .iter()
            .map(|&h| self.tree.text_content(h))
            .collect()
    }

    pub fn config(&self) -> &HighlighterConfig {
        &self.config
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    /// Give the tree back, highlights included
    pub fn into_tree(self) -> T {
        self.tree
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Replace the config with one carrying the patched fields
    ///
    /// Existing highlights are left as they are, except that a renamed
    /// `active_class` is taken off the wrapper that carried it.
    pub fn update_config(&mut self, patch: ConfigPatch) {
        let config = self.config.merged(patch);
        if config.active_class != self.config.active_class {
            for &id in &self.highlights {
                self.tree.remove_class(id, &self.config.active_class);
            }
        }
        self.config = config;
    }

    /// Replace the hooks present in `patch`, keeping the others
    pub fn update_callbacks(&mut self, patch: Callbacks) {
        self.callbacks = std::mem::take(&mut self.callbacks).merged(patch);
    }
}

fn check_global(pattern: &Pattern) -> Result<()> {
    if pattern.is_global() {
        Ok(())
    } else {
        Err(HighlightError::InvalidPattern(format!(
            "{pattern} must have the global flag"
        )))
    }
}
