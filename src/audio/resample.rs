//! Audio resampling utilities.
//!
//! Converts clips between sample rates, used when ensemble members
//! produce audio at different rates.

use rubato::{FftFixedIn, Resampler};

use crate::error::{ErrorCode, PipelineError, Result};
use crate::types::RawAudio;

/// Resamples mono audio from one sample rate to another.
///
/// Uses FFT-based resampling. Equal rates return a copy.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    if from_rate == 0 || to_rate == 0 {
        return Err(PipelineError::new(
            ErrorCode::InferenceFailed,
            format!("Cannot resample {} Hz -> {} Hz", from_rate, to_rate),
        ));
    }

    let chunk_size = 1024;
    let sub_chunks = 2;

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        chunk_size,
        sub_chunks,
        1, // mono
    )
    .map_err(|e| {
        PipelineError::new(
            ErrorCode::InferenceFailed,
            format!("Failed to create resampler: {}", e),
        )
    })?;

    let output_size = (samples.len() as f64 * to_rate as f64 / from_rate as f64).ceil() as usize;
    let mut output = Vec::with_capacity(output_size);

    let input_frames = resampler.input_frames_next();
    let mut position = 0;

    while position < samples.len() {
        let end = (position + input_frames).min(samples.len());
        let mut chunk = samples[position..end].to_vec();

        // Pad the last chunk
        if chunk.len() < input_frames {
            chunk.resize(input_frames, 0.0);
        }

        let input = vec![chunk];
        let resampled = resampler.process(&input, None).map_err(|e| {
            PipelineError::new(
                ErrorCode::InferenceFailed,
                format!("Resampling failed: {}", e),
            )
        })?;

        output.extend_from_slice(&resampled[0]);
        position += input_frames;
    }

    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    output.truncate(expected_len);

    Ok(output)
}

/// Resamples interleaved audio channel by channel.
pub fn resample_audio(audio: &RawAudio, to_rate: u32) -> Result<RawAudio> {
    if audio.sample_rate == to_rate {
        return Ok(audio.clone());
    }

    let channels = audio.channels.max(1) as usize;
    let mut per_channel = Vec::with_capacity(channels);
    for ch in 0..channels {
        let mono: Vec<f32> = audio.samples.iter().skip(ch).step_by(channels).copied().collect();
        per_channel.push(resample(&mono, audio.sample_rate, to_rate)?);
    }

    let frames = per_channel.iter().map(Vec::len).min().unwrap_or(0);
    let mut samples = Vec::with_capacity(frames * channels);
    for frame in 0..frames {
        for channel in &per_channel {
            samples.push(channel[frame]);
        }
    }

    Ok(RawAudio {
        samples,
        sample_rate: to_rate,
        channels: audio.channels,
        bit_depth: audio.bit_depth,
    })
}
