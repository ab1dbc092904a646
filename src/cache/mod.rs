//! Cache module for generation results.
//!
//! Provides a bounded FIFO cache keyed by sanitized prompt and model.

pub mod artifacts;

// Re-export commonly used types
pub use artifacts::{CacheKey, ResultCache, SharedCache, DEFAULT_CAPACITY};
