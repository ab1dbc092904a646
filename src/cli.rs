//! Command-line interface.
//!
//! Flags override the values read from `CLIPFORGE_*` environment variables.

use std::path::PathBuf;

use clap::Parser;

use crate::config::PipelineConfig;

/// clipforge: prompt-to-audio generation pipeline
#[derive(Parser, Debug)]
#[command(name = "clipforge")]
#[command(about = "Generate short audio clips from text prompts")]
#[command(version)]
pub struct Cli {
    /// Text prompt describing the audio to generate
    #[arg(short, long)]
    pub prompt: String,

    /// Preferred model route (general, percussion, piano, hybrid)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory for generated mp3/ogg/wav files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// WAV file returned when generation fails
    #[arg(long)]
    pub fallback: Option<PathBuf>,

    /// JSON file with per-route generation parameters
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Maximum number of cached results
    #[arg(long)]
    pub cache_capacity: Option<usize>,

    /// Sample rate of the built-in models in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Issue the same request this many times (later ones hit the cache)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub repeat: u32,

    /// Report live preview chunks on stderr
    #[arg(long)]
    pub preview: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Applies flag overrides on top of `config`.
    pub fn apply_to(&self, config: &mut PipelineConfig) {
        if let Some(ref dir) = self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(ref path) = self.fallback {
            config.fallback_path = Some(path.clone());
        }
        if let Some(ref path) = self.params {
            config.params_path = Some(path.clone());
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache_capacity = capacity;
        }
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(ref path) = self.ffmpeg {
            config.ffmpeg_path = Some(path.clone());
        }
    }
}
