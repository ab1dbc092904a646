//! End-to-end generation pipeline.
//!
//! Composes sanitization, routing, the result cache, inference,
//! post-processing and export into one `generate` operation. Faults past
//! sanitization are logged once here and turned into the fallback
//! artifact; they never reach the caller.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::audio::{ensure_fallback_asset, AudioCodec, FormatExporter, PostProcessor};
use crate::cache::{CacheKey, SharedCache};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::models::{ModelId, ModelParamTable, ModelRegistry, PreviewSink};
use crate::types::{CleanPrompt, OutputArtifact, PipelineStage};

use super::executor::InferenceExecutor;
use super::router::ModelRouter;

/// The generation pipeline orchestrator.
///
/// Shared by reference (typically behind an `Arc`) between concurrent
/// requests. The registry and parameter table are read-only; only the
/// cache is mutated.
#[derive(Debug)]
pub struct Pipeline {
    router: ModelRouter,
    params: Arc<ModelParamTable>,
    cache: SharedCache,
    executor: InferenceExecutor,
    processor: PostProcessor,
    exporter: FormatExporter,
    fallback: OutputArtifact,
}

/// Per-request progress, for logging.
struct Request {
    stage: PipelineStage,
    model: Option<ModelId>,
}

impl Request {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
            model: None,
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        debug!("{} -> {}", self.stage, stage);
        self.stage = stage;
    }
}

impl Pipeline {
    /// Creates a pipeline with built-in parameters, a default-sized cache
    /// and preview disabled.
    pub fn new(
        registry: Arc<ModelRegistry>,
        exporter: FormatExporter,
        fallback_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            router: ModelRouter::default(),
            params: Arc::new(ModelParamTable::builtin()),
            cache: SharedCache::default(),
            executor: InferenceExecutor::new(registry),
            processor: PostProcessor::new(),
            exporter,
            fallback: OutputArtifact::fallback(fallback_path),
        }
    }

    /// Builds a pipeline from configuration.
    ///
    /// Loads the parameter file if one is configured and writes the
    /// fallback asset if it does not exist yet.
    pub fn from_config(
        config: &PipelineConfig,
        registry: Arc<ModelRegistry>,
        codec: Arc<dyn AudioCodec>,
    ) -> Result<Self> {
        if let Some(reason) = config.validate() {
            return Err(PipelineError::invalid_config(reason));
        }

        let params = match &config.params_path {
            Some(path) => ModelParamTable::load(path)?,
            None => ModelParamTable::builtin(),
        };

        let missing = registry.missing_routes();
        if !missing.is_empty() {
            warn!("No model registered for routes {:?}", missing);
        }

        let fallback_path = config.effective_fallback_path();
        ensure_fallback_asset(&fallback_path, config.sample_rate)?;

        let exporter = FormatExporter::new(codec, config.effective_output_dir());

        Ok(Self::new(registry, exporter, fallback_path)
            .with_params(Arc::new(params))
            .with_cache(SharedCache::with_capacity(config.cache_capacity)))
    }

    /// Replaces the parameter table.
    pub fn with_params(mut self, params: Arc<ModelParamTable>) -> Self {
        self.params = params;
        self
    }

    /// Replaces the result cache.
    pub fn with_cache(mut self, cache: SharedCache) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the router.
    pub fn with_router(mut self, router: ModelRouter) -> Self {
        self.router = router;
        self
    }

    /// Delivers model preview chunks to `preview`.
    pub fn with_preview(mut self, preview: PreviewSink) -> Self {
        self.executor = self.executor.with_preview(preview);
        self
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Returns the fallback artifact.
    pub fn fallback(&self) -> &OutputArtifact {
        &self.fallback
    }

    /// Generates audio for a prompt.
    ///
    /// Fails only with `INVALID_PROMPT` when the prompt is empty or too
    /// long after sanitization. Any later fault yields the fallback
    /// artifact.
    pub async fn generate(
        &self,
        prompt: &str,
        preference: Option<&str>,
    ) -> Result<OutputArtifact> {
        let mut request = Request::new();

        request.enter(PipelineStage::Sanitizing);
        let clean = CleanPrompt::sanitize(prompt)?;

        match self.run(&clean, preference, &mut request).await {
            Ok(artifact) => {
                request.enter(PipelineStage::Done);
                Ok(artifact)
            }
            Err(e) => {
                let failed_at = request.stage;
                request.enter(PipelineStage::Failed);
                warn!(
                    prompt = %clean,
                    model = request.model.map(|m| m.as_str()).unwrap_or("none"),
                    stage = %failed_at,
                    code = %e.code,
                    kind = e.code.description(),
                    "Generation failed, returning fallback: {}",
                    e.message
                );
                Ok(self.fallback.clone())
            }
        }
    }

    /// Generates audio for a prompt, always returning an artifact.
    ///
    /// Invalid prompts also map to the fallback artifact.
    pub async fn generate_audio(&self, prompt: &str, preference: Option<&str>) -> OutputArtifact {
        match self.generate(prompt, preference).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(
                    code = %e.code,
                    kind = e.code.description(),
                    "Rejected prompt, returning fallback: {}",
                    e.message
                );
                self.fallback.clone()
            }
        }
    }

    async fn run(
        &self,
        clean: &CleanPrompt,
        preference: Option<&str>,
        request: &mut Request,
    ) -> Result<OutputArtifact> {
        request.enter(PipelineStage::Routing);
        let model = self.router.route(clean, preference);
        request.model = Some(model);

        request.enter(PipelineStage::CacheCheck);
        let key = CacheKey::new(clean.clone(), model);
        if let Some(artifact) = self.cache.get(&key) {
            request.enter(PipelineStage::CacheHit);
            info!("Cache hit for '{}' on {}", clean, model);
            return Ok(artifact);
        }

        request.enter(PipelineStage::CacheMiss);
        info!("Cache miss for '{}', generating with {}", clean, model);

        request.enter(PipelineStage::Inferring);
        let params = self.params.get(model);
        let raw = self.executor.run(clean, model, params).await?;

        request.enter(PipelineStage::PostProcessing);
        let processed = self.processor.process(raw);

        request.enter(PipelineStage::Exporting);
        let artifact = self.exporter.export(&processed, &key.artifact_name())?;

        request.enter(PipelineStage::Caching);
        self.cache.put(key, artifact.clone());

        info!(
            "Generated {} ms clip for '{}' with {}",
            processed.duration_ms(),
            clean,
            model
        );
        Ok(artifact)
    }
}
