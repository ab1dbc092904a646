//! Multi-format export of processed clips.
//!
//! Every format is first encoded into a staging directory private to the
//! export call. Files are renamed into the output directory only after all
//! three formats encoded, so a failed export leaves nothing behind and
//! concurrent exports of the same clip never see each other's partial
//! files. The last rename wins.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::types::{AudioFormat, OutputArtifact, ProcessedAudio};

use super::codec::AudioCodec;

/// Encodes one processed clip into every delivery format.
#[derive(Clone)]
pub struct FormatExporter {
    codec: Arc<dyn AudioCodec>,
    output_dir: PathBuf,
}

impl FormatExporter {
    /// Creates an exporter writing into `output_dir` through `codec`.
    pub fn new(codec: Arc<dyn AudioCodec>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            codec,
            output_dir: output_dir.into(),
        }
    }

    /// Encodes `processed` as mp3, ogg and wav named `<base_name>.<ext>`.
    ///
    /// All three come from the same processed samples. The first codec
    /// failure aborts the export and discards the formats already encoded.
    pub fn export(&self, processed: &ProcessedAudio, base_name: &str) -> Result<OutputArtifact> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            PipelineError::encode_failed(
                "output",
                format!("Failed to create {}: {}", self.output_dir.display(), e),
            )
        })?;

        // Removed with everything in it when dropped
        let staging = tempfile::Builder::new()
            .prefix(".export-")
            .tempdir_in(&self.output_dir)
            .map_err(|e| {
                PipelineError::encode_failed("output", format!("Failed to create staging dir: {}", e))
            })?;

        let mut staged = Vec::with_capacity(AudioFormat::ALL.len());
        for format in AudioFormat::ALL {
            let file_name = format!("{}.{}", base_name, format.as_str());
            let written = self
                .codec
                .encode(processed, format, &staging.path().join(&file_name))?;
            debug!("Encoded {} via {} -> {}", format, self.codec.name(), written.display());
            staged.push((format, written, self.output_dir.join(file_name)));
        }

        let mut files = BTreeMap::new();
        for (format, written, dest) in staged {
            std::fs::rename(&written, &dest).map_err(|e| {
                PipelineError::encode_failed(
                    format,
                    format!("Failed to move into {}: {}", dest.display(), e),
                )
            })?;
            files.insert(format, dest);
        }

        Ok(OutputArtifact::new(files))
    }
}

impl std::fmt::Debug for FormatExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatExporter")
            .field("codec", &self.codec.name())
            .field("output_dir", &self.output_dir)
            .finish()
    }
}
