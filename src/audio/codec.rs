//! Codec collaborators that turn processed audio into delivery files.
//!
//! The exporter only depends on the [`AudioCodec`] trait. [`FfmpegCodec`]
//! writes WAV in-process and transcodes MP3 and Ogg Vorbis with an
//! external `ffmpeg` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::types::{AudioFormat, ProcessedAudio};

use super::wav::write_wav;

/// Default MP3 bitrate in kbps.
pub const DEFAULT_MP3_BITRATE_KBPS: u32 = 192;

/// Default Ogg Vorbis bitrate in kbps.
pub const DEFAULT_OGG_BITRATE_KBPS: u32 = 160;

/// Encodes processed audio to a named container format.
pub trait AudioCodec: Send + Sync {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Encodes `audio` as `format`, writing the file at `dest`.
    ///
    /// Returns the path of the written file.
    fn encode(&self, audio: &ProcessedAudio, format: AudioFormat, dest: &Path) -> Result<PathBuf>;
}

/// Codec backed by hound for WAV and ffmpeg for lossy formats.
///
/// `encode` blocks the calling thread until ffmpeg exits. Each call stages
/// its WAV input in its own temporary file next to `dest`.
#[derive(Debug, Clone)]
pub struct FfmpegCodec {
    binary: PathBuf,
    mp3_bitrate_kbps: u32,
    ogg_bitrate_kbps: u32,
}

impl FfmpegCodec {
    /// Creates a codec invoking `ffmpeg` from PATH.
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    /// Creates a codec invoking the given ffmpeg binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            mp3_bitrate_kbps: DEFAULT_MP3_BITRATE_KBPS,
            ogg_bitrate_kbps: DEFAULT_OGG_BITRATE_KBPS,
        }
    }

    /// Returns the ffmpeg arguments for a lossy transcode.
    fn encoder_args(&self, format: AudioFormat) -> Option<(&'static str, u32)> {
        match format {
            AudioFormat::Mp3 => Some(("libmp3lame", self.mp3_bitrate_kbps)),
            AudioFormat::Ogg => Some(("libvorbis", self.ogg_bitrate_kbps)),
            AudioFormat::Wav => None,
        }
    }

    fn transcode(&self, source: &Path, dest: &Path, format: AudioFormat) -> Result<()> {
        let Some((encoder, bitrate)) = self.encoder_args(format) else {
            return Err(PipelineError::encode_failed(format, "not a lossy format"));
        };

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-y", "-i"])
            .arg(source)
            .args(["-vn", "-c:a", encoder, "-b:a", &format!("{}k", bitrate)])
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                PipelineError::encode_failed(
                    format,
                    format!("failed to run {}: {}", self.binary.display(), e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::encode_failed(format, stderr.trim().to_string()));
        }

        Ok(())
    }
}

impl Default for FfmpegCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCodec for FfmpegCodec {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode(&self, audio: &ProcessedAudio, format: AudioFormat, dest: &Path) -> Result<PathBuf> {
        if format == AudioFormat::Wav {
            write_wav(audio.audio(), dest)?;
            return Ok(dest.to_path_buf());
        }

        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| {
            PipelineError::encode_failed(format, format!("Failed to create {}: {}", dir.display(), e))
        })?;
        let staging = tempfile::Builder::new()
            .prefix(".stage-")
            .suffix(".wav")
            .tempfile_in(dir)
            .map_err(|e| {
                PipelineError::encode_failed(format, format!("Failed to create staging file: {}", e))
            })?;
        write_wav(audio.audio(), staging.path())?;
        debug!("Transcoding {} -> {}", staging.path().display(), dest.display());

        // The staging file is removed when `staging` drops
        self.transcode(staging.path(), dest, format)?;

        Ok(dest.to_path_buf())
    }
}
