//! clipforge: prompt-to-audio generation pipeline.
//!
//! Turns a free-text prompt into a polished, loudness-normalized clip in
//! mp3, ogg and wav. A request is sanitized, routed to one of four model
//! routes by keyword analysis, looked up in a bounded FIFO cache and, on a
//! miss, generated, post-processed and exported.
//!
//! # Modules
//!
//! - [`types`]: Prompts, audio buffers, artifacts and pipeline stages
//! - [`models`]: Model routes, parameters, the model registry and built-in models
//! - [`generation`]: Analysis, routing, inference and the [`Pipeline`] orchestrator
//! - [`cache`]: The result cache
//! - [`audio`]: Post-processing, resampling and export
//! - [`config`]: Runtime configuration
//! - [`error`]: Error types and codes
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clipforge::{audio::FfmpegCodec, models::ModelRegistry, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::from_env();
//! let registry = Arc::new(ModelRegistry::builtin(config.sample_rate));
//! let pipeline = Pipeline::from_config(&config, registry, Arc::new(FfmpegCodec::new()))?;
//!
//! let artifact = pipeline.generate_audio("slow jazz piano", None).await;
//! ```

pub mod audio;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::PipelineConfig;
pub use error::{ErrorCode, PipelineError, Result};
pub use generation::Pipeline;
pub use models::ModelId;
pub use types::{AudioFormat, CleanPrompt, OutputArtifact};
