//! Audio buffers produced by models and consumed by post-processing.

/// Bit depth of delivered PCM when a model does not specify one.
pub const DEFAULT_BIT_DEPTH: u16 = 16;

/// Audio samples as produced by a model.
///
/// Samples are interleaved `f32` values in `[-1.0, 1.0]`. A `RawAudio` is
/// owned by the request that generated it until it is handed to the
/// post-processor.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudio {
    /// Interleaved samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Bit depth used when encoding to integer PCM.
    pub bit_depth: u16,
}

impl RawAudio {
    /// Creates audio with the default bit depth.
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
            bit_depth: DEFAULT_BIT_DEPTH,
        }
    }

    /// Creates mono audio with the default bit depth.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Returns true if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Returns the clip length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Returns the number of frames covering `ms` milliseconds.
    pub fn frames_for_ms(&self, ms: u64) -> usize {
        (ms * self.sample_rate as u64 / 1000) as usize
    }

    /// Returns the interleaved samples of one frame.
    pub fn frame(&self, index: usize) -> &[f32] {
        let channels = self.channels.max(1) as usize;
        &self.samples[index * channels..(index + 1) * channels]
    }
}

/// Audio after the fixed post-processing chain.
///
/// Only the post-processor builds these, so holding one means every stage
/// has run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedAudio(RawAudio);

impl ProcessedAudio {
    pub(crate) fn from_processed(audio: RawAudio) -> Self {
        Self(audio)
    }

    /// Returns the processed samples and format.
    pub fn audio(&self) -> &RawAudio {
        &self.0
    }

    /// Returns the interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.0.samples
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.0.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> u16 {
        self.0.channels
    }

    /// Returns the bit depth used for integer PCM encodings.
    pub fn bit_depth(&self) -> u16 {
        self.0.bit_depth
    }

    /// Returns the clip length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.0.duration_ms()
    }
}

/// A partial block of audio streamed during generation for live preview.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Sequence number of the chunk within one generation, starting at 0.
    pub index: usize,
    /// Interleaved samples.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}
