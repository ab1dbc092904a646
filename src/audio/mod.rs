//! Audio processing and output.
//!
//! Provides the post-processing chain, resampling, WAV encoding and the
//! multi-format exporter.

pub mod codec;
pub mod export;
pub mod level;
pub mod process;
pub mod resample;
pub mod wav;

// Re-export commonly used items
pub use codec::{AudioCodec, FfmpegCodec};
pub use export::FormatExporter;
pub use process::{fade_duration_ms, PostProcessor};
pub use resample::{resample, resample_audio};
pub use wav::{ensure_fallback_asset, samples_to_duration, write_wav};
