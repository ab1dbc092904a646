//! Ensemble model combining several capabilities.
//!
//! Members run concurrently on the same prompt and parameters; their
//! outputs are brought to a common rate and layout and averaged.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;

use crate::audio::resample_audio;
use crate::types::{AudioChunk, RawAudio};

use super::params::GenerationParams;
use super::preview::PreviewSink;
use super::registry::{AudioModel, ModelError};

/// Runs member models together and mixes their output.
pub struct EnsembleModel {
    name: String,
    members: Vec<Arc<dyn AudioModel>>,
}

impl EnsembleModel {
    /// Creates an ensemble from its members.
    pub fn new(name: impl Into<String>, members: Vec<Arc<dyn AudioModel>>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the ensemble has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[async_trait]
impl AudioModel for EnsembleModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        preview: &PreviewSink,
    ) -> std::result::Result<RawAudio, ModelError> {
        if self.members.is_empty() {
            return Err(format!("ensemble '{}' has no members", self.name).into());
        }

        // Members stream nothing; only the mix is previewed.
        let silent = PreviewSink::disabled();
        let outputs = try_join_all(
            self.members
                .iter()
                .map(|member| member.generate(prompt, params, &silent)),
        )
        .await?;

        debug!(
            "Ensemble '{}' mixing {} member outputs",
            self.name,
            outputs.len()
        );
        let mixed = mix(outputs)?;

        preview.send(AudioChunk {
            index: 0,
            samples: mixed.samples.clone(),
            sample_rate: mixed.sample_rate,
            channels: mixed.channels,
        });

        Ok(mixed)
    }
}

/// Averages member outputs at the first member's rate and channel count.
fn mix(outputs: Vec<RawAudio>) -> std::result::Result<RawAudio, ModelError> {
    let mut iter = outputs.into_iter();
    let first = iter.next().ok_or("nothing to mix")?;
    let rate = first.sample_rate;
    let channels = first.channels.max(1);

    let mut aligned = vec![first];
    for output in iter {
        let resampled = resample_audio(&output, rate)?;
        aligned.push(with_channels(resampled, channels));
    }

    let len = aligned.iter().map(|a| a.samples.len()).max().unwrap_or(0);
    let scale = 1.0 / aligned.len() as f32;
    let mut samples = vec![0.0f32; len];
    for audio in &aligned {
        for (acc, s) in samples.iter_mut().zip(&audio.samples) {
            *acc += s * scale;
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate: rate,
        channels,
        bit_depth: aligned[0].bit_depth,
    })
}

/// Converts to the target channel count through a mono downmix.
fn with_channels(audio: RawAudio, channels: u16) -> RawAudio {
    if audio.channels == channels {
        return audio;
    }

    let src = audio.channels.max(1) as usize;
    let dst = channels.max(1) as usize;
    let mut samples = Vec::with_capacity(audio.frames() * dst);
    for frame in audio.samples.chunks_exact(src) {
        let mono = frame.iter().sum::<f32>() / src as f32;
        samples.extend(std::iter::repeat(mono).take(dst));
    }

    RawAudio {
        samples,
        sample_rate: audio.sample_rate,
        channels,
        bit_depth: audio.bit_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct Constant {
        level: f32,
        frames: usize,
        sample_rate: u32,
        channels: u16,
    }

    #[async_trait]
    impl AudioModel for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
            preview: &PreviewSink,
        ) -> std::result::Result<RawAudio, ModelError> {
            preview.send(AudioChunk {
                index: 0,
                samples: vec![self.level],
                sample_rate: self.sample_rate,
                channels: self.channels,
            });
            Ok(RawAudio::new(
                vec![self.level; self.frames * self.channels as usize],
                self.sample_rate,
                self.channels,
            ))
        }
    }

    struct Broken;

    #[async_trait]
    impl AudioModel for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
            _preview: &PreviewSink,
        ) -> std::result::Result<RawAudio, ModelError> {
            Err("weights corrupted".into())
        }
    }

    fn constant(level: f32, frames: usize, channels: u16) -> Arc<dyn AudioModel> {
        Arc::new(Constant {
            level,
            frames,
            sample_rate: 8000,
            channels,
        })
    }

    #[tokio::test]
    async fn averages_members() {
        let ensemble = EnsembleModel::new("mix", vec![constant(0.2, 100, 1), constant(0.6, 100, 1)]);
        let out = ensemble
            .generate("x", &GenerationParams::new(), &PreviewSink::disabled())
            .await
            .unwrap();
        assert_eq!(out.frames(), 100);
        assert!(out.samples.iter().all(|s| (s - 0.4).abs() < 1e-6));
    }

    #[tokio::test]
    async fn pads_shorter_members_and_matches_layout() {
        let ensemble = EnsembleModel::new("mix", vec![constant(0.5, 10, 2), constant(0.5, 5, 1)]);
        let out = ensemble
            .generate("x", &GenerationParams::new(), &PreviewSink::disabled())
            .await
            .unwrap();
        assert_eq!(out.channels, 2);
        assert_eq!(out.frames(), 10);
        assert!((out.samples[0] - 0.5).abs() < 1e-6);
        assert!((out.samples[19] - 0.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn previews_only_the_mix() {
        let ensemble = EnsembleModel::new("mix", vec![constant(0.1, 4, 1), constant(0.3, 4, 1)]);
        let (tx, mut rx) = mpsc::channel(8);
        ensemble
            .generate("x", &GenerationParams::new(), &PreviewSink::new(tx))
            .await
            .unwrap();

        let chunk = rx.try_recv().unwrap();
        assert_eq!(chunk.samples.len(), 4);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn member_failure_fails_ensemble() {
        let ensemble = EnsembleModel::new("mix", vec![constant(0.1, 4, 1), Arc::new(Broken)]);
        let err = ensemble
            .generate("x", &GenerationParams::new(), &PreviewSink::disabled())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("weights corrupted"));
    }

    #[tokio::test]
    async fn empty_ensemble_is_an_error() {
        let ensemble = EnsembleModel::new("none", Vec::new());
        assert!(ensemble.is_empty());
        assert!(ensemble
            .generate("x", &GenerationParams::new(), &PreviewSink::disabled())
            .await
            .is_err());
    }
}
