//! WAV encoding.
//!
//! Writes audio to WAV using the hound crate. Integer PCM is used for 16-
//! and 24-bit clips, IEEE float for 32-bit.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{PipelineError, Result};
use crate::types::RawAudio;

/// Length of the generated fallback asset.
pub const FALLBACK_SECONDS: u32 = 1;

fn wav_error(reason: impl std::fmt::Display) -> PipelineError {
    PipelineError::encode_failed("wav", reason.to_string())
}

fn spec_for(audio: &RawAudio) -> Result<WavSpec> {
    let sample_format = match audio.bit_depth {
        16 | 24 => SampleFormat::Int,
        32 => SampleFormat::Float,
        other => return Err(wav_error(format!("unsupported bit depth {}", other))),
    };

    Ok(WavSpec {
        channels: audio.channels.max(1),
        sample_rate: audio.sample_rate,
        bits_per_sample: audio.bit_depth,
        sample_format,
    })
}

fn write_samples(writer: &mut WavWriter<BufWriter<File>>, audio: &RawAudio) -> Result<()> {
    for &sample in &audio.samples {
        let sample = sample.clamp(-1.0, 1.0);
        let written = match audio.bit_depth {
            16 => writer.write_sample((sample * i16::MAX as f32).round() as i16),
            24 => writer.write_sample((sample * 8_388_607.0).round() as i32),
            _ => writer.write_sample(sample),
        };
        written.map_err(|e| wav_error(format!("Failed to write sample: {}", e)))?;
    }
    Ok(())
}

/// Writes audio to a WAV file.
///
/// # Example
///
/// ```ignore
/// use clipforge::audio::write_wav;
/// use clipforge::types::RawAudio;
///
/// let audio = RawAudio::mono(vec![0.0, 0.5, -0.5, 0.0], 44100);
/// write_wav(&audio, Path::new("/tmp/test.wav"))?;
/// ```
pub fn write_wav(audio: &RawAudio, path: &Path) -> Result<()> {
    let spec = spec_for(audio)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| wav_error(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| wav_error(format!("Failed to create WAV file: {}", e)))?;

    write_samples(&mut writer, audio)?;

    writer
        .finalize()
        .map_err(|e| wav_error(format!("Failed to finalize WAV file: {}", e)))?;

    Ok(())
}

/// Calculates the duration of audio in seconds from frame count.
pub fn samples_to_duration(frame_count: usize, sample_rate: u32) -> f32 {
    frame_count as f32 / sample_rate as f32
}

/// Makes sure the fallback asset exists, writing one second of silence if not.
///
/// An existing file is left as is.
pub fn ensure_fallback_asset(path: &Path, sample_rate: u32) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let silence = RawAudio::mono(vec![0.0; (sample_rate * FALLBACK_SECONDS) as usize], sample_rate);
    write_wav(&silence, path)
}
