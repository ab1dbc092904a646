//! Pipeline stage tracking for a single request.

use serde::{Deserialize, Serialize};

/// Position of a request in the pipeline state machine.
///
/// `Received -> Sanitizing -> Routing -> CacheCheck`, then either
/// `CacheHit -> Done` or `CacheMiss -> Inferring -> PostProcessing ->
/// Exporting -> Caching -> Done`. Any fault past `Sanitizing` moves to
/// `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Request accepted, nothing done yet.
    #[default]
    Received,
    /// Trimming and validating the raw prompt.
    Sanitizing,
    /// Selecting a model route.
    Routing,
    /// Looking up the result cache.
    CacheCheck,
    /// A cached artifact was found.
    CacheHit,
    /// No cached artifact, generation required.
    CacheMiss,
    /// Awaiting the model capability.
    Inferring,
    /// Running the fixed transform chain.
    PostProcessing,
    /// Encoding delivery formats.
    Exporting,
    /// Storing the new artifact.
    Caching,
    /// Artifact returned to the caller.
    Done,
    /// A stage faulted; the fallback artifact was returned.
    Failed,
}

impl PipelineStage {
    /// Returns the string representation of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Sanitizing => "sanitizing",
            PipelineStage::Routing => "routing",
            PipelineStage::CacheCheck => "cache_check",
            PipelineStage::CacheHit => "cache_hit",
            PipelineStage::CacheMiss => "cache_miss",
            PipelineStage::Inferring => "inferring",
            PipelineStage::PostProcessing => "post_processing",
            PipelineStage::Exporting => "exporting",
            PipelineStage::Caching => "caching",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    /// Returns true if the request has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_terminal() {
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Received.is_terminal());
        assert!(!PipelineStage::Inferring.is_terminal());
        assert!(!PipelineStage::CacheHit.is_terminal());
    }

    #[test]
    fn stage_display() {
        assert_eq!(PipelineStage::PostProcessing.to_string(), "post_processing");
        assert_eq!(PipelineStage::default(), PipelineStage::Received);
    }
}
