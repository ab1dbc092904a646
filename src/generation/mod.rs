//! Request handling.
//!
//! - [`PromptAnalyzer`]: Keyword-table prompt analysis
//! - [`ModelRouter`]: Preference and rule based route selection
//! - [`InferenceExecutor`]: Asynchronous model invocation
//! - [`Pipeline`]: The end-to-end orchestrator

pub mod analyzer;
pub mod executor;
pub mod pipeline;
pub mod router;

// Re-export commonly used items
pub use analyzer::{Genre, Instrument, PromptAnalysis, PromptAnalyzer};
pub use executor::InferenceExecutor;
pub use pipeline::Pipeline;
pub use router::{apply_rules, ModelRouter};
