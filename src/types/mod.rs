//! Core types for clipforge.
//!
//! This module re-exports the data types that flow through the pipeline:
//! - [`CleanPrompt`]: A sanitized prompt, the canonical analysis and cache input
//! - [`RawAudio`] / [`ProcessedAudio`]: Audio before and after post-processing
//! - [`OutputArtifact`]: Encoded delivery formats produced for one request
//! - [`PipelineStage`]: Per-request state machine position

mod artifact;
mod audio;
mod prompt;
mod stage;

// Re-export all types at the module level
pub use artifact::{AudioFormat, OutputArtifact};
pub use audio::{AudioChunk, ProcessedAudio, RawAudio};
pub use prompt::{CleanPrompt, MAX_PROMPT_CHARS};
pub use stage::PipelineStage;
