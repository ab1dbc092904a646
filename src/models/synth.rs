//! Built-in procedural generation model.
//!
//! Synthesizes short phrases deterministically from the prompt text so the
//! pipeline can run end to end without external model weights. The same
//! prompt and parameters always produce identical samples.

use std::f32::consts::PI;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use sha2::{Digest, Sha256};

use crate::types::{AudioChunk, RawAudio};

use super::params::GenerationParams;
use super::preview::PreviewSink;
use super::registry::{AudioModel, ModelError};

/// Minor pentatonic scale degrees in semitones.
const SCALE: [i32; 5] = [0, 3, 5, 7, 10];

/// Preview chunk length in seconds.
const CHUNK_SECONDS: f64 = 1.0;

/// Sound character of a [`SynthModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
    /// Sustained tones with a soft second harmonic.
    Tonal,
    /// Struck notes with exponential decay.
    Keys,
    /// Kick and hi-hat pattern.
    Percussive,
}

impl Voice {
    /// Returns the string representation of the voice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Tonal => "tonal",
            Voice::Keys => "keys",
            Voice::Percussive => "percussive",
        }
    }

    fn note_seconds(&self) -> f32 {
        match self {
            Voice::Tonal => 0.5,
            Voice::Keys => 0.75,
            Voice::Percussive => 0.25,
        }
    }

    fn base_freq(&self) -> f32 {
        match self {
            Voice::Tonal => 220.0,
            Voice::Keys => 261.63,
            Voice::Percussive => 60.0,
        }
    }
}

/// A deterministic synthesizer implementing [`AudioModel`].
#[derive(Debug, Clone)]
pub struct SynthModel {
    voice: Voice,
    sample_rate: u32,
    name: String,
}

#[derive(Debug, Clone, Copy)]
struct Note {
    /// Zero marks an unpitched (noise) hit.
    freq: f32,
    amp: f32,
}

struct Plan {
    notes: Vec<Note>,
    note_frames: usize,
    brightness: f32,
}

impl SynthModel {
    /// Creates a synth for the given voice and output rate.
    pub fn new(voice: Voice, sample_rate: u32) -> Self {
        Self {
            voice,
            sample_rate,
            name: format!("synth-{}", voice.as_str()),
        }
    }

    /// Returns the voice.
    pub fn voice(&self) -> Voice {
        self.voice
    }

    fn plan(&self, rng: &mut ChaCha8Rng, total_frames: usize, params: &GenerationParams) -> Plan {
        let note_frames = ((self.voice.note_seconds() * self.sample_rate as f32) as usize).max(1);
        let count = total_frames.div_ceil(note_frames);
        let temperature = params.get("temperature").unwrap_or(0.5).clamp(0.0, 2.0) as f32;
        let brightness = params
            .get("conditioning_strength")
            .unwrap_or(0.5)
            .clamp(0.0, 1.0) as f32;

        let mut notes = Vec::with_capacity(count);
        match self.voice {
            Voice::Tonal | Voice::Keys => {
                let mut degree = rng.gen_range(0..SCALE.len());
                for _ in 0..count {
                    if rng.gen::<f32>() < temperature.min(1.0) {
                        degree = rng.gen_range(0..SCALE.len());
                    } else if rng.gen_bool(0.5) {
                        degree = (degree + 1) % SCALE.len();
                    } else {
                        degree = (degree + SCALE.len() - 1) % SCALE.len();
                    }
                    let semis = SCALE[degree] as f32;
                    notes.push(Note {
                        freq: self.voice.base_freq() * 2f32.powf(semis / 12.0),
                        amp: 0.4 + rng.gen_range(0.0f32..0.2) * temperature,
                    });
                }
            }
            Voice::Percussive => {
                let guidance = params.get("guidance_scale").unwrap_or(3.0) as f32;
                let hat_amp = (guidance / 10.0).clamp(0.05, 0.5);
                for i in 0..count {
                    let note = if i % 2 == 0 {
                        Note {
                            freq: self.voice.base_freq(),
                            amp: 0.8,
                        }
                    } else {
                        Note {
                            freq: 0.0,
                            amp: hat_amp,
                        }
                    };
                    notes.push(note);
                }
            }
        }

        Plan {
            notes,
            note_frames,
            brightness,
        }
    }

    fn render(&self, plan: &Plan, frame: usize, rng: &mut ChaCha8Rng) -> f32 {
        let note = plan.notes[frame / plan.note_frames];
        let pos = frame % plan.note_frames;
        let t = pos as f32 / self.sample_rate as f32;
        let phase = 2.0 * PI * note.freq * t;

        let value = match self.voice {
            Voice::Tonal => {
                let ramp = (self.sample_rate as f32 * 0.01).max(1.0);
                let env = (pos as f32 / ramp)
                    .min((plan.note_frames - pos) as f32 / ramp)
                    .min(1.0);
                note.amp * env * (phase.sin() + 0.3 * (2.0 * phase).sin()) / 1.3
            }
            Voice::Keys => {
                let decay = (-3.0 * t).exp();
                let b = plan.brightness;
                note.amp * decay * (phase.sin() + 0.5 * b * (2.0 * phase).sin()) / (1.0 + 0.5 * b)
            }
            Voice::Percussive => {
                if note.freq > 0.0 {
                    note.amp * (-12.0 * t).exp() * phase.sin()
                } else {
                    let noise: f32 = rng.sample(StandardNormal);
                    note.amp * (-40.0 * t).exp() * noise * 0.3
                }
            }
        };

        value.clamp(-1.0, 1.0)
    }
}

#[async_trait]
impl AudioModel for SynthModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        preview: &PreviewSink,
    ) -> std::result::Result<RawAudio, ModelError> {
        if self.sample_rate == 0 {
            return Err("synth sample rate must be positive".into());
        }

        let duration = params.duration_sec();
        if !(duration > 0.0 && duration.is_finite()) {
            return Err(format!("invalid duration: {}", duration).into());
        }

        let total_frames = (duration * self.sample_rate as f64).round() as usize;
        let block = ((CHUNK_SECONDS * self.sample_rate as f64) as usize).max(1);

        let mut rng = ChaCha8Rng::seed_from_u64(prompt_seed(prompt, self.voice));
        let plan = self.plan(&mut rng, total_frames, params);

        let mut samples = Vec::with_capacity(total_frames);
        for (index, start) in (0..total_frames).step_by(block).enumerate() {
            let end = (start + block).min(total_frames);
            let rendered: Vec<f32> = (start..end)
                .map(|frame| self.render(&plan, frame, &mut rng))
                .collect();

            if preview.is_enabled() {
                preview.send(AudioChunk {
                    index,
                    samples: rendered.clone(),
                    sample_rate: self.sample_rate,
                    channels: 1,
                });
            }
            samples.extend_from_slice(&rendered);

            tokio::task::yield_now().await;
        }

        Ok(RawAudio::mono(samples, self.sample_rate))
    }
}

/// Derives a reproducible RNG seed from the prompt and voice.
fn prompt_seed(prompt: &str, voice: Voice) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn params(duration: f64) -> GenerationParams {
        GenerationParams::new().with("duration", duration)
    }

    #[tokio::test]
    async fn output_length_matches_duration() {
        let synth = SynthModel::new(Voice::Tonal, 8000);
        let audio = synth
            .generate("ambient pad", &params(2.5), &PreviewSink::disabled())
            .await
            .unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.frames(), 20000);
        assert!(audio.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn same_prompt_is_deterministic() {
        let synth = SynthModel::new(Voice::Percussive, 8000);
        let sink = PreviewSink::disabled();
        let a = synth.generate("fast drums", &params(1.0), &sink).await.unwrap();
        let b = synth.generate("fast drums", &params(1.0), &sink).await.unwrap();
        let c = synth.generate("slow drums", &params(1.0), &sink).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn streams_one_chunk_per_second() {
        let synth = SynthModel::new(Voice::Keys, 4000);
        let (tx, mut rx) = mpsc::channel(16);
        let audio = synth
            .generate("solo piano", &params(3.0), &PreviewSink::new(tx))
            .await
            .unwrap();

        let mut streamed = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            streamed.push(chunk);
        }
        assert_eq!(streamed.len(), 3);
        assert_eq!(streamed[2].index, 2);
        let joined: Vec<f32> = streamed.into_iter().flat_map(|c| c.samples).collect();
        assert_eq!(joined, audio.samples);
    }

    #[tokio::test]
    async fn full_preview_channel_does_not_fail() {
        let synth = SynthModel::new(Voice::Tonal, 4000);
        let (tx, _rx) = mpsc::channel(1);
        let audio = synth
            .generate("rock", &params(3.0), &PreviewSink::new(tx))
            .await
            .unwrap();
        assert_eq!(audio.frames(), 12000);
    }

    #[tokio::test]
    async fn rejects_invalid_configuration() {
        let sink = PreviewSink::disabled();
        let zero_rate = SynthModel::new(Voice::Tonal, 0);
        assert!(zero_rate.generate("x", &params(1.0), &sink).await.is_err());

        let synth = SynthModel::new(Voice::Tonal, 8000);
        assert!(synth.generate("x", &params(-1.0), &sink).await.is_err());
    }

    #[test]
    fn model_name_includes_voice() {
        assert_eq!(SynthModel::new(Voice::Keys, 8000).name(), "synth-keys");
    }
}
