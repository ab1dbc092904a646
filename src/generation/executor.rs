//! Asynchronous model invocation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::models::{GenerationParams, ModelId, ModelRegistry, PreviewSink};
use crate::types::{CleanPrompt, RawAudio};

/// Runs the model bound to a route.
///
/// Awaiting [`run`](Self::run) is the only suspension point of a pipeline
/// request. Dropping the future cancels the model call.
#[derive(Debug, Clone)]
pub struct InferenceExecutor {
    registry: Arc<ModelRegistry>,
    preview: PreviewSink,
}

impl InferenceExecutor {
    /// Creates an executor over a registry, with preview disabled.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            preview: PreviewSink::disabled(),
        }
    }

    /// Returns the executor delivering preview chunks to `preview`.
    pub fn with_preview(mut self, preview: PreviewSink) -> Self {
        self.preview = preview;
        self
    }

    /// Returns the registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Generates raw audio for a prompt with the given route and parameters.
    ///
    /// Fails with `UNKNOWN_MODEL` if the route has no model, and with
    /// `INFERENCE_FAILED` if the model errors or returns no samples.
    pub async fn run(
        &self,
        prompt: &CleanPrompt,
        model: ModelId,
        params: &GenerationParams,
    ) -> Result<RawAudio> {
        let capability = self
            .registry
            .model_for(model)
            .ok_or_else(|| PipelineError::unknown_model(model))?;

        debug!(
            "Invoking {} for route {} (duration {}s)",
            capability.name(),
            model,
            params.duration_sec()
        );

        let start = Instant::now();
        let raw = capability
            .generate(prompt.as_str(), params, &self.preview)
            .await
            .map_err(|e| PipelineError::inference_failed(model, e))?;

        if raw.is_empty() {
            return Err(PipelineError::inference_failed(
                model,
                "model returned no samples".into(),
            ));
        }

        info!(
            "{} produced {} ms of audio in {:.2}s",
            capability.name(),
            raw.duration_ms(),
            start.elapsed().as_secs_f32()
        );

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::models::{AudioModel, ModelError};
    use crate::types::AudioChunk;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct Echo;

    #[async_trait]
    impl AudioModel for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            prompt: &str,
            params: &GenerationParams,
            preview: &PreviewSink,
        ) -> std::result::Result<RawAudio, ModelError> {
            let frames = (params.duration_sec() * 100.0) as usize;
            let samples = vec![prompt.len() as f32 / 100.0; frames];
            preview.send(AudioChunk {
                index: 0,
                samples: samples.clone(),
                sample_rate: 100,
                channels: 1,
            });
            Ok(RawAudio::mono(samples, 100))
        }
    }

    struct Silent;

    #[async_trait]
    impl AudioModel for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
            _preview: &PreviewSink,
        ) -> std::result::Result<RawAudio, ModelError> {
            Ok(RawAudio::mono(Vec::new(), 100))
        }
    }

    fn prompt(text: &str) -> CleanPrompt {
        CleanPrompt::sanitize(text).unwrap()
    }

    fn registry() -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::builder()
                .register(ModelId::General, Arc::new(Echo))
                .register(ModelId::Piano, Arc::new(Silent))
                .build(),
        )
    }

    #[tokio::test]
    async fn runs_bound_model_with_params() {
        let executor = InferenceExecutor::new(registry());
        let params = GenerationParams::new().with("duration", 2.0);

        let raw = executor.run(&prompt("abcd"), ModelId::General, &params).await.unwrap();
        assert_eq!(raw.frames(), 200);
        assert!((raw.samples[0] - 0.04).abs() < 1e-6);
    }

    #[tokio::test]
    async fn unbound_route_is_unknown_model() {
        let executor = InferenceExecutor::new(registry());
        let err = executor
            .run(&prompt("x"), ModelId::Hybrid, &GenerationParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownModel);
    }

    #[tokio::test]
    async fn empty_output_is_inference_failure() {
        let executor = InferenceExecutor::new(registry());
        let err = executor
            .run(&prompt("x"), ModelId::Piano, &GenerationParams::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InferenceFailed);
    }

    #[tokio::test]
    async fn preview_chunks_reach_the_sink() {
        let (tx, mut rx) = mpsc::channel(4);
        let executor = InferenceExecutor::new(registry()).with_preview(PreviewSink::new(tx));

        executor
            .run(&prompt("x"), ModelId::General, &GenerationParams::new().with("duration", 1.0))
            .await
            .unwrap();
        assert_eq!(rx.try_recv().unwrap().samples.len(), 100);
    }

    #[tokio::test]
    async fn closed_preview_does_not_fail() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let executor = InferenceExecutor::new(registry()).with_preview(PreviewSink::new(tx));

        let raw = executor
            .run(&prompt("x"), ModelId::General, &GenerationParams::new().with("duration", 1.0))
            .await;
        assert!(raw.is_ok());
    }
}
