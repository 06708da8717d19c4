//! Observer hooks
//!
//! All hooks are optional. Like the config, a callback set is replaced
//! rather than edited: `merged` keeps the old hooks the patch leaves out.

use crate::dom::NodeId;

pub type AppliedFn = Box<dyn FnMut(usize, &[String]) + Send>;
pub type RemovedFn = Box<dyn FnMut() + Send>;
pub type NavigateFn = Box<dyn FnMut(usize, usize, NodeId) + Send>;

#[derive(Default)]
pub struct Callbacks {
    /// `(match_count, keywords)` after every apply
    pub on_highlight_applied: Option<AppliedFn>,
    /// After every remove
    pub on_highlight_removed: Option<RemovedFn>,
    /// `(index, total, element)` after every change of the active highlight
    pub on_navigate: Option<NavigateFn>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_highlight_applied", &self.on_highlight_applied.is_some())
            .field("on_highlight_removed", &self.on_highlight_removed.is_some())
            .field("on_navigate", &self.on_navigate.is_some())
            .finish()
    }
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_highlight_applied(mut self, f: impl FnMut(usize, &[String]) + Send + 'static) -> Self {
        self.on_highlight_applied = Some(Box::new(f));
        self
    }

    pub fn on_highlight_removed(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_highlight_removed = Some(Box::new(f));
        self
    }

    pub fn on_navigate(mut self, f: impl FnMut(usize, usize, NodeId) + Send + 'static) -> Self {
        self.on_navigate = Some(Box::new(f));
        self
    }

    /// Hooks set in `patch` win, the rest are kept
    pub fn merged(self, patch: Callbacks) -> Self {
        Callbacks {
            on_highlight_applied: patch.on_highlight_applied.or(self.on_highlight_applied),
            on_highlight_removed: patch.on_highlight_removed.or(self.on_highlight_removed),
            on_navigate: patch.on_navigate.or(self.on_navigate),
        }
    }

    pub(crate) fn fire_applied(&mut self, count: usize, keywords: &[String]) {
        if let Some(f) = self.on_highlight_applied.as_mut() {
            f(count, keywords);
        }
    }

    pub(crate) fn fire_removed(&mut self) {
        if let Some(f) = self.on_highlight_removed.as_mut() {
            f();
        }
    }

    pub(crate) fn fire_navigate(&mut self, index: usize, total: usize, element: NodeId) {
        if let Some(f) = self.on_navigate.as_mut() {
            f(index, total, element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_fire_without_hooks_is_noop() {
        let mut callbacks = Callbacks::new();
        callbacks.fire_applied(1, &[]);
        callbacks.fire_removed();
        callbacks.fire_navigate(0, 1, 3);
    }

    #[test]
    fn test_merged_keeps_unpatched_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b, c) = (log.clone(), log.clone(), log.clone());

        let callbacks = Callbacks::new()
            .on_highlight_applied(move |n, _| a.lock().unwrap().push(format!("applied {n}")))
            .on_highlight_removed(move || b.lock().unwrap().push("removed".to_string()));
        let mut merged =
            callbacks.merged(Callbacks::new().on_highlight_removed(move || c.lock().unwrap().push("new removed".to_string())));

        merged.fire_applied(2, &["x".to_string()]);
        merged.fire_removed();
        assert_eq!(*log.lock().unwrap(), vec!["applied 2", "new removed"]);
    }
}
