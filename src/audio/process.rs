//! Fixed post-processing chain.
//!
//! Every generated clip goes through the same five stages, in order:
//! peak normalization, compression, edge silence trimming, loudness
//! matching and fades. Trimming runs after compression and before the
//! loudness stage so the final gain is measured on the trimmed clip.

use tracing::debug;

use crate::types::{ProcessedAudio, RawAudio};

use super::level::{apply_gain, db_to_gain, gain_to_db, peak, rms_dbfs};

/// Headroom left below full scale by peak normalization.
pub const PEAK_HEADROOM_DB: f32 = 0.1;

/// Compressor threshold in dBFS.
pub const COMPRESSOR_THRESHOLD_DB: f32 = -20.0;

/// Compressor ratio (input dB over threshold per output dB).
pub const COMPRESSOR_RATIO: f32 = 4.0;

/// Compressor envelope attack time.
pub const COMPRESSOR_ATTACK_MS: f32 = 5.0;

/// Compressor envelope release time.
pub const COMPRESSOR_RELEASE_MS: f32 = 50.0;

/// Frames at or below this level count as silence.
pub const SILENCE_THRESHOLD_DB: f32 = -50.0;

/// Shortest edge silence run that gets trimmed.
pub const MIN_SILENCE_MS: u64 = 500;

/// Loudness the final gain stage targets.
pub const TARGET_LOUDNESS_DBFS: f32 = -14.0;

/// Upper bound on fade length.
pub const MAX_FADE_MS: u64 = 500;

/// One transform of the chain.
pub type Stage = fn(RawAudio) -> RawAudio;

/// The chain, in application order.
pub const STAGES: [(&str, Stage); 5] = [
    ("normalize", normalize_peak),
    ("compress", compress),
    ("trim_silence", trim_silence),
    ("match_loudness", match_loudness),
    ("fade", apply_fades),
];

/// Applies the fixed transform chain to raw model output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostProcessor;

impl PostProcessor {
    /// Creates a post-processor.
    pub fn new() -> Self {
        Self
    }

    /// Runs every stage in order.
    pub fn process(&self, raw: RawAudio) -> ProcessedAudio {
        let processed = STAGES.iter().fold(raw, |audio, (name, stage)| {
            let out = stage(audio);
            debug!(
                "Post-process stage '{}': {} frames, rms {:.1} dBFS",
                name,
                out.frames(),
                rms_dbfs(&out.samples)
            );
            out
        });
        ProcessedAudio::from_processed(processed)
    }
}

/// Scales the clip so its peak sits [`PEAK_HEADROOM_DB`] below full scale.
pub fn normalize_peak(mut audio: RawAudio) -> RawAudio {
    let current = peak(&audio.samples);
    if current > 0.0 {
        apply_gain(&mut audio.samples, db_to_gain(-PEAK_HEADROOM_DB) / current);
    }
    audio
}

/// Downward compression above [`COMPRESSOR_THRESHOLD_DB`] at [`COMPRESSOR_RATIO`].
///
/// The detector follows the per-frame peak with separate attack and
/// release smoothing; the same gain is applied to every channel of a frame.
pub fn compress(mut audio: RawAudio) -> RawAudio {
    if audio.is_empty() || audio.sample_rate == 0 {
        return audio;
    }

    let rate = audio.sample_rate as f32;
    let attack = (-1.0 / (COMPRESSOR_ATTACK_MS / 1000.0 * rate)).exp();
    let release = (-1.0 / (COMPRESSOR_RELEASE_MS / 1000.0 * rate)).exp();
    let slope = 1.0 - 1.0 / COMPRESSOR_RATIO;
    let channels = audio.channels.max(1) as usize;

    let mut envelope = 0.0f32;
    for frame in audio.samples.chunks_exact_mut(channels) {
        let level = peak(frame);
        let coeff = if level > envelope { attack } else { release };
        envelope = coeff * envelope + (1.0 - coeff) * level;

        let over = gain_to_db(envelope) - COMPRESSOR_THRESHOLD_DB;
        if over > 0.0 {
            let gain = db_to_gain(-over * slope);
            for s in frame.iter_mut() {
                *s *= gain;
            }
        }
    }

    audio
}

/// Removes silence runs of at least [`MIN_SILENCE_MS`] from both edges.
///
/// Silence inside the clip is never touched. A clip that is silent
/// throughout is returned unchanged.
pub fn trim_silence(mut audio: RawAudio) -> RawAudio {
    let frames = audio.frames();
    if frames == 0 {
        return audio;
    }

    let threshold = db_to_gain(SILENCE_THRESHOLD_DB);
    let is_silent = |i: usize| peak(audio.frame(i)) <= threshold;

    let leading = (0..frames).take_while(|&i| is_silent(i)).count();
    if leading == frames {
        return audio;
    }
    let trailing = (0..frames).rev().take_while(|&i| is_silent(i)).count();

    let min_run = audio.frames_for_ms(MIN_SILENCE_MS).max(1);
    let start = if leading >= min_run { leading } else { 0 };
    let end = if trailing >= min_run { frames - trailing } else { frames };

    if start > 0 || end < frames {
        let channels = audio.channels.max(1) as usize;
        audio.samples.truncate(end * channels);
        audio.samples.drain(..start * channels);
    }

    audio
}

/// Applies gain so the clip's RMS level reaches [`TARGET_LOUDNESS_DBFS`].
pub fn match_loudness(mut audio: RawAudio) -> RawAudio {
    let measured = rms_dbfs(&audio.samples);
    if measured.is_finite() {
        apply_gain(&mut audio.samples, db_to_gain(TARGET_LOUDNESS_DBFS - measured));
    }
    audio
}

/// Returns the fade length for a clip: the smaller of 500 ms and 10% of it.
pub fn fade_duration_ms(clip_ms: u64) -> u64 {
    MAX_FADE_MS.min(clip_ms / 10)
}

/// Linear fade-in and fade-out of [`fade_duration_ms`] at both ends.
pub fn apply_fades(mut audio: RawAudio) -> RawAudio {
    let frames = audio.frames();
    let fade_frames = audio.frames_for_ms(fade_duration_ms(audio.duration_ms())).min(frames / 2);
    if fade_frames == 0 {
        return audio;
    }

    let channels = audio.channels.max(1) as usize;
    for i in 0..fade_frames {
        let gain = i as f32 / fade_frames as f32;
        let head = i * channels;
        let tail = (frames - 1 - i) * channels;
        for ch in 0..channels {
            audio.samples[head + ch] *= gain;
            audio.samples[tail + ch] *= gain;
        }
    }

    audio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::level::rms;

    fn constant(level: f32, frames: usize) -> Vec<f32> {
        vec![level; frames]
    }

    fn sine(freq: f32, frames: usize, sample_rate: u32, amp: f32) -> Vec<f32> {
        (0..frames)
            .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn stage_order_is_fixed() {
        let names: Vec<&str> = STAGES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["normalize", "compress", "trim_silence", "match_loudness", "fade"]
        );
    }

    #[test]
    fn normalize_targets_peak_headroom() {
        let audio = normalize_peak(RawAudio::mono(vec![0.1, -0.25, 0.2], 1000));
        assert!((peak(&audio.samples) - db_to_gain(-PEAK_HEADROOM_DB)).abs() < 1e-5);

        let silent = normalize_peak(RawAudio::mono(vec![0.0; 4], 1000));
        assert_eq!(silent.samples, vec![0.0; 4]);
    }

    #[test]
    fn compress_reduces_loud_signal() {
        let audio = compress(RawAudio::mono(constant(0.9, 2000), 1000));
        let settled = *audio.samples.last().unwrap();
        // 0.9 is ~19 dB over threshold; 4:1 leaves ~4.8 dB over it
        assert!(settled < 0.9 * 0.25, "settled at {}", settled);
        assert!(settled > db_to_gain(COMPRESSOR_THRESHOLD_DB));
    }

    #[test]
    fn compress_leaves_quiet_signal_untouched() {
        let input = constant(0.05, 500);
        let audio = compress(RawAudio::mono(input.clone(), 1000));
        assert_eq!(audio.samples, input);
    }

    #[test]
    fn trim_removes_only_long_edge_silence() {
        let rate = 1000;
        let mut samples = constant(0.0, 600);
        samples.extend(constant(0.5, 1000));
        samples.extend(constant(0.0, 700));
        samples.extend(constant(0.5, 1000));
        samples.extend(constant(0.0, 200));

        let audio = trim_silence(RawAudio::mono(samples, rate));

        // Leading 600 ms gone, interior 700 ms and trailing 200 ms kept
        assert_eq!(audio.frames(), 2900);
        assert_eq!(audio.samples[0], 0.5);
        assert_eq!(audio.samples[1000..1700], vec![0.0; 700][..]);
        assert_eq!(*audio.samples.last().unwrap(), 0.0);
    }

    #[test]
    fn trim_removes_long_trailing_silence_in_stereo() {
        let rate = 1000;
        let mut samples = constant(0.3, 400 * 2);
        samples.extend(constant(0.0, 500 * 2));

        let audio = trim_silence(RawAudio::new(samples, rate, 2));
        assert_eq!(audio.frames(), 400);
        assert_eq!(audio.channels, 2);
    }

    #[test]
    fn trim_keeps_short_leading_silence_and_silent_clips() {
        let rate = 1000;
        let mut samples = constant(0.0, 400);
        samples.extend(constant(0.5, 100));
        assert_eq!(trim_silence(RawAudio::mono(samples, rate)).frames(), 500);

        let silent = trim_silence(RawAudio::mono(constant(0.0, 2000), rate));
        assert_eq!(silent.frames(), 2000);
    }

    #[test]
    fn trim_treats_threshold_level_as_silence() {
        let rate = 1000;
        let floor = db_to_gain(SILENCE_THRESHOLD_DB) * 0.5;
        let mut samples = constant(floor, 600);
        samples.extend(constant(0.5, 100));
        assert_eq!(trim_silence(RawAudio::mono(samples, rate)).frames(), 100);
    }

    #[test]
    fn loudness_reaches_target() {
        let audio = match_loudness(RawAudio::mono(sine(220.0, 8000, 8000, 0.05), 8000));
        assert!((rms_dbfs(&audio.samples) - TARGET_LOUDNESS_DBFS).abs() < 0.05);
    }

    #[test]
    fn fade_duration_is_bounded() {
        assert_eq!(fade_duration_ms(10_000), 500);
        assert_eq!(fade_duration_ms(5_000), 500);
        assert_eq!(fade_duration_ms(3_000), 300);
        assert_eq!(fade_duration_ms(0), 0);
        for clip_ms in [0, 1, 99, 1_000, 4_999, 60_000] {
            let fade = fade_duration_ms(clip_ms);
            assert!(fade <= MAX_FADE_MS);
            assert!(fade <= clip_ms / 10);
        }
    }

    #[test]
    fn fades_ramp_both_edges() {
        let rate = 1000;
        let audio = apply_fades(RawAudio::mono(constant(0.5, 2000), rate));
        // 2 s clip -> 200 ms fades
        assert_eq!(audio.samples[0], 0.0);
        assert_eq!(*audio.samples.last().unwrap(), 0.0);
        assert!((audio.samples[100] - 0.25).abs() < 1e-6);
        assert_eq!(audio.samples[200], 0.5);
        assert_eq!(audio.samples[1799], 0.5);
        assert!(audio.samples[1900] < 0.5);
    }

    #[test]
    fn full_chain_trims_and_levels() {
        let rate = 8000;
        let mut samples = constant(0.0, 8000);
        samples.extend(sine(330.0, 16000, rate, 0.3));
        let processed = PostProcessor::new().process(RawAudio::mono(samples, rate));

        assert_eq!(processed.sample_rate(), rate);
        // Leading second of silence (plus the sine's zero crossing) is gone
        let frames = processed.audio().frames();
        assert!((15_990..=16_000).contains(&frames), "frames {}", frames);
        assert_eq!(processed.samples()[0], 0.0);

        // Fades pull the level slightly under target
        let level = gain_to_db(rms(processed.samples()));
        assert!((level - TARGET_LOUDNESS_DBFS).abs() < 1.5, "level {}", level);
        assert!(processed.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
