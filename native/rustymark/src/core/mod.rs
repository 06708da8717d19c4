//! Core markup primitives
//!
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: entity decoding with Cow (zero-copy when possible) and escaping for output

pub mod entities;
pub mod scanner;
