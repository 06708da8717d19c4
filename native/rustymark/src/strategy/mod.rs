//! Execution strategies
//!
//! - Sequential planning: default, used by the batched async path
//! - Parallel planning: Rayon, used by the sync path on large documents

pub mod parallel;

pub use parallel::{plan_parallel, plan_sequential};
