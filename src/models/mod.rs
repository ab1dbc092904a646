//! Generation models and routing identifiers.
//!
//! - [`ModelId`](backend::ModelId): The closed set of generation routes
//! - [`ModelParamTable`](params::ModelParamTable): Per-route generation parameters
//! - [`AudioModel`](registry::AudioModel): The generation capability trait
//! - [`ModelRegistry`](registry::ModelRegistry): Init-once route -> model mapping
//! - [`SynthModel`](synth::SynthModel) / [`EnsembleModel`](ensemble::EnsembleModel): Built-in capabilities

pub mod backend;
pub mod ensemble;
pub mod params;
pub mod preview;
pub mod registry;
pub mod synth;

// Re-export commonly used types
pub use backend::ModelId;
pub use ensemble::EnsembleModel;
pub use params::{GenerationParams, ModelParamTable, DEFAULT_DURATION_SEC, MAX_DURATION_SEC};
pub use preview::PreviewSink;
pub use registry::{AudioModel, ModelError, ModelRegistry, RegistryBuilder};
pub use synth::{SynthModel, Voice};
