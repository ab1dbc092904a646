//! Output artifacts: the encoded delivery formats for one request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Delivery formats produced for every generated clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Lossy-compressed MPEG layer III.
    Mp3,
    /// Open lossy-compressed Ogg Vorbis.
    Ogg,
    /// Uncompressed PCM WAV.
    Wav,
}

impl AudioFormat {
    /// All formats, in export order.
    pub const ALL: [AudioFormat; 3] = [AudioFormat::Mp3, AudioFormat::Ogg, AudioFormat::Wav];

    /// Returns the format name, which is also the file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Wav => "wav",
        }
    }

    /// Parses a format from its name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" | "vorbis" => Some(AudioFormat::Ogg),
            "wav" | "wave" => Some(AudioFormat::Wav),
            _ => None,
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The encoded outputs produced for one request, keyed by format.
///
/// Artifacts are immutable once built; the cache hands out clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Reference to the encoded bytes for each format.
    files: BTreeMap<AudioFormat, PathBuf>,
    /// True if this is the fixed error/silence asset rather than a generation.
    is_fallback: bool,
}

impl OutputArtifact {
    /// Builds an artifact from encoded format references.
    pub fn new(files: BTreeMap<AudioFormat, PathBuf>) -> Self {
        Self {
            files,
            is_fallback: false,
        }
    }

    /// Builds the fallback artifact pointing at a pre-existing WAV asset.
    pub fn fallback(path: impl Into<PathBuf>) -> Self {
        let mut files = BTreeMap::new();
        files.insert(AudioFormat::Wav, path.into());
        Self {
            files,
            is_fallback: true,
        }
    }

    /// Returns the reference for a format, if present.
    pub fn get(&self, format: AudioFormat) -> Option<&Path> {
        self.files.get(&format).map(PathBuf::as_path)
    }

    /// Returns all format references.
    pub fn files(&self) -> &BTreeMap<AudioFormat, PathBuf> {
        &self.files
    }

    /// Returns the number of encoded formats.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no formats are present.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns true if this is the fallback artifact.
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}
