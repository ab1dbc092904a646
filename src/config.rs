//! Pipeline configuration module.
//!
//! Contains the runtime configuration for clipforge: where artifacts and
//! the fallback asset live, cache sizing and the output sample rate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::DEFAULT_CAPACITY;

/// Default sample rate the built-in models render at.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default number of preview chunks buffered before new ones are dropped.
pub const DEFAULT_PREVIEW_BUFFER: usize = 32;

/// Name of the fallback asset inside the data directory.
const FALLBACK_FILE_NAME: &str = "default_error_audio.wav";

/// Runtime configuration for the pipeline.
///
/// This configuration is typically loaded from environment variables at
/// startup and then overridden by command-line arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory for generated artifacts.
    /// If None, uses the platform-specific default cache location.
    pub output_dir: Option<PathBuf>,

    /// WAV asset returned when a request fails.
    /// If None, uses the platform-specific default data location.
    pub fallback_path: Option<PathBuf>,

    /// JSON file replacing the built-in per-route parameters.
    pub params_path: Option<PathBuf>,

    /// Maximum number of cached results.
    pub cache_capacity: usize,

    /// Sample rate of the built-in models and the fallback asset.
    pub sample_rate: u32,

    /// Preview chunk buffer size.
    pub preview_buffer: usize,

    /// ffmpeg binary used for mp3 and ogg. If None, `ffmpeg` from PATH.
    pub ffmpeg_path: Option<PathBuf>,
}

impl PipelineConfig {
    /// Creates a PipelineConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a PipelineConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CLIPFORGE_OUTPUT_DIR` - Artifact directory
    /// - `CLIPFORGE_FALLBACK_PATH` - Fallback WAV asset
    /// - `CLIPFORGE_PARAMS_PATH` - Parameter table JSON file
    /// - `CLIPFORGE_CACHE_CAPACITY` - Maximum cached results
    /// - `CLIPFORGE_SAMPLE_RATE` - Model sample rate in Hz
    /// - `CLIPFORGE_PREVIEW_BUFFER` - Preview chunk buffer size
    /// - `CLIPFORGE_FFMPEG` - ffmpeg binary
    ///
    /// Falls back to defaults for unset or unparsable variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("CLIPFORGE_OUTPUT_DIR") {
            config.output_dir = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("CLIPFORGE_FALLBACK_PATH") {
            config.fallback_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("CLIPFORGE_PARAMS_PATH") {
            config.params_path = Some(PathBuf::from(path));
        }

        if let Some(capacity) = lookup("CLIPFORGE_CACHE_CAPACITY").and_then(|v| v.parse().ok()) {
            config.cache_capacity = capacity;
        }

        if let Some(rate) = lookup("CLIPFORGE_SAMPLE_RATE").and_then(|v| v.parse::<u32>().ok()) {
            if rate > 0 {
                config.sample_rate = rate;
            }
        }

        if let Some(size) = lookup("CLIPFORGE_PREVIEW_BUFFER").and_then(|v| v.parse::<usize>().ok()) {
            if size > 0 {
                config.preview_buffer = size;
            }
        }

        if let Some(path) = lookup("CLIPFORGE_FFMPEG") {
            config.ffmpeg_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Returns the effective output directory, using platform defaults if not specified.
    pub fn effective_output_dir(&self) -> PathBuf {
        if let Some(ref path) = self.output_dir {
            path.clone()
        } else {
            default_output_dir()
        }
    }

    /// Returns the effective fallback asset path, using platform defaults if not specified.
    pub fn effective_fallback_path(&self) -> PathBuf {
        if let Some(ref path) = self.fallback_path {
            path.clone()
        } else {
            default_fallback_path()
        }
    }

    /// Returns the effective ffmpeg binary.
    pub fn effective_ffmpeg_path(&self) -> PathBuf {
        self.ffmpeg_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("ffmpeg"))
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Some(format!(
                "sample_rate out of range: {} (expected 8000-192000)",
                self.sample_rate
            ));
        }

        if self.preview_buffer == 0 {
            return Some("preview_buffer must be > 0".to_string());
        }

        if self.cache_capacity > 100_000 {
            return Some(format!(
                "cache_capacity too high: {} (max 100000)",
                self.cache_capacity
            ));
        }

        None
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            fallback_path: None,
            params_path: None,
            cache_capacity: DEFAULT_CAPACITY,
            sample_rate: DEFAULT_SAMPLE_RATE,
            preview_buffer: DEFAULT_PREVIEW_BUFFER,
            ffmpeg_path: None,
        }
    }
}

/// Returns the platform-specific default artifact directory.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/clipforge/clips
/// - Linux: ~/.cache/clipforge/clips
/// - Windows: C:\Users\<user>\AppData\Local\clipforge\cache\clips
fn default_output_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "clipforge") {
        proj_dirs.cache_dir().join("clips")
    } else {
        // Fallback to current directory
        PathBuf::from("./clips")
    }
}

/// Returns the platform-specific default fallback asset path.
fn default_fallback_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "clipforge") {
        proj_dirs.data_dir().join(FALLBACK_FILE_NAME)
    } else {
        PathBuf::from(".").join(FALLBACK_FILE_NAME)
    }
}
