//! Highlight Module - search term highlighting over a text tree
//!
//! Components:
//! - `Highlighter`: wraps matches, tracks the active match, navigates
//! - `config`: instance configuration and per-call options
//! - `pattern`: keyword alternation building and custom patterns
//! - `fragment`: planning and applying leaf replacements
//! - `viewport`: geometry for smart scrolling
//! - `scheduler`: yield points for the batched async path
//! - `callbacks`: observer hooks

pub mod callbacks;
pub mod config;
pub mod fragment;
pub mod highlighter;
pub mod pattern;
pub mod scheduler;
pub mod viewport;

pub use callbacks::Callbacks;
pub use config::{ConfigPatch, HighlightOptions, HighlighterConfig, ScrollAlign, ScrollBehavior, ScrollMode};
pub use highlighter::Highlighter;
pub use pattern::{IntoKeywords, Pattern};
pub use scheduler::{NoYield, Scheduler, TaskYield};
pub use viewport::{is_comfortably_visible, LineLayout, NoViewport, Rect, Viewport};
