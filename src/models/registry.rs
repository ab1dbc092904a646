//! Model capabilities and the process-wide registry.
//!
//! The registry is populated once at startup and never mutated; it is
//! shared by `Arc` and injected into the executor rather than living in a
//! global.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::types::RawAudio;

use super::backend::ModelId;
use super::ensemble::EnsembleModel;
use super::params::GenerationParams;
use super::preview::PreviewSink;
use super::synth::{SynthModel, Voice};

/// Error raised by a model capability.
pub type ModelError = Box<dyn std::error::Error + Send + Sync>;

/// A generation capability: prompt and parameters in, raw audio out.
#[async_trait]
pub trait AudioModel: Send + Sync {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Generates audio, pushing partial chunks to `preview` as they are ready.
    ///
    /// Dropping the returned future cancels generation.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        preview: &PreviewSink,
    ) -> std::result::Result<RawAudio, ModelError>;
}

/// Read-only mapping from route to model capability.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<ModelId, Arc<dyn AudioModel>>,
}

impl ModelRegistry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builds the registry of built-in procedural models.
    ///
    /// `hybrid` is an ensemble of the general and piano voices.
    pub fn builtin(sample_rate: u32) -> Self {
        let general: Arc<dyn AudioModel> = Arc::new(SynthModel::new(Voice::Tonal, sample_rate));
        let piano: Arc<dyn AudioModel> = Arc::new(SynthModel::new(Voice::Keys, sample_rate));
        let percussion: Arc<dyn AudioModel> =
            Arc::new(SynthModel::new(Voice::Percussive, sample_rate));
        let hybrid: Arc<dyn AudioModel> = Arc::new(EnsembleModel::new(
            "hybrid-ensemble",
            vec![Arc::clone(&general), Arc::clone(&piano)],
        ));

        Self::builder()
            .register(ModelId::General, general)
            .register(ModelId::Percussion, percussion)
            .register(ModelId::Piano, piano)
            .register(ModelId::Hybrid, hybrid)
            .build()
    }

    /// Returns the model bound to a route.
    pub fn model_for(&self, model: ModelId) -> Option<Arc<dyn AudioModel>> {
        self.models.get(&model).cloned()
    }

    /// Returns the routes that have no model bound.
    pub fn missing_routes(&self) -> Vec<ModelId> {
        ModelId::ALL
            .into_iter()
            .filter(|id| !self.models.contains_key(id))
            .collect()
    }

    /// Returns the number of bound routes.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no routes are bound.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for id in ModelId::ALL {
            if let Some(model) = self.models.get(&id) {
                map.entry(&id.as_str(), &model.name());
            }
        }
        map.finish()
    }
}

/// Collects model bindings before freezing them into a [`ModelRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    models: HashMap<ModelId, Arc<dyn AudioModel>>,
}

impl RegistryBuilder {
    /// Binds a model to a route, replacing any earlier binding.
    pub fn register(mut self, model: ModelId, capability: Arc<dyn AudioModel>) -> Self {
        self.models.insert(model, capability);
        self
    }

    /// Freezes the bindings.
    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_complete() {
        let registry = ModelRegistry::builtin(22050);
        assert_eq!(registry.len(), 4);
        assert!(registry.missing_routes().is_empty());
        assert_eq!(
            registry.model_for(ModelId::Hybrid).unwrap().name(),
            "hybrid-ensemble"
        );
    }

    #[test]
    fn partial_registry_reports_missing_routes() {
        let registry = ModelRegistry::builder()
            .register(
                ModelId::General,
                Arc::new(SynthModel::new(Voice::Tonal, 8000)),
            )
            .build();

        assert!(registry.model_for(ModelId::General).is_some());
        assert!(registry.model_for(ModelId::Piano).is_none());
        assert_eq!(
            registry.missing_routes(),
            vec![ModelId::Percussion, ModelId::Piano, ModelId::Hybrid]
        );
    }

    #[test]
    fn debug_lists_bound_models() {
        let registry = ModelRegistry::builtin(8000);
        let debug = format!("{:?}", registry);
        assert!(debug.contains("general"));
        assert!(debug.contains("hybrid-ensemble"));
    }
}
