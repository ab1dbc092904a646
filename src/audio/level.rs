//! Level measurement and gain helpers in dBFS.

/// Converts decibels to a linear gain factor.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Converts a linear amplitude to decibels; zero maps to negative infinity.
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * gain.log10()
    }
}

/// Returns the largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Returns the root-mean-square amplitude.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Returns the RMS level in dBFS; silence is negative infinity.
pub fn rms_dbfs(samples: &[f32]) -> f32 {
    gain_to_db(rms(samples))
}

/// Multiplies every sample by `gain`, clamping to full scale.
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    for s in samples.iter_mut() {
        *s = (*s * gain).clamp(-1.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
        assert!((gain_to_db(0.5) + 6.0206).abs() < 1e-3);
        assert_eq!(gain_to_db(0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn peak_and_rms() {
        let samples = [0.5, -0.5, 0.5, -0.5];
        assert_eq!(peak(&samples), 0.5);
        assert!((rms(&samples) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms_dbfs(&[0.0; 8]), f32::NEG_INFINITY);
    }

    #[test]
    fn gain_is_clamped() {
        let mut samples = [0.6, -0.6, 0.1];
        apply_gain(&mut samples, 2.0);
        assert_eq!(samples, [1.0, -1.0, 0.2]);
    }
}
