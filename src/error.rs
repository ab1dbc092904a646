//! Error types for the clipforge pipeline.
//!
//! Defines the error codes and the error type shared by every pipeline
//! stage, so faults can be logged and classified consistently at the
//! orchestrator boundary.

use std::fmt;

/// Error codes identifying the class of a pipeline fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Prompt text is invalid.
    /// Trigger: Empty prompt after sanitization or exceeds 1000 characters.
    InvalidPrompt,

    /// No model is bound to the routed identifier.
    /// Trigger: Registry populated without one of the four routes.
    UnknownModel,

    /// The model capability failed during generation.
    /// Trigger: Any error raised by a model's generate call.
    InferenceFailed,

    /// The codec collaborator failed to encode an output format.
    /// Trigger: Disk full, missing encoder binary, unsupported format.
    EncodeFailed,

    /// Configuration or parameter table could not be used.
    /// Trigger: Unreadable or malformed parameter file, bad values.
    InvalidConfig,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPrompt => "INVALID_PROMPT",
            ErrorCode::UnknownModel => "UNKNOWN_MODEL",
            ErrorCode::InferenceFailed => "INFERENCE_FAILED",
            ErrorCode::EncodeFailed => "ENCODE_FAILED",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPrompt => "Prompt must be non-empty and at most 1000 characters",
            ErrorCode::UnknownModel => "No generation model is registered for the selected route",
            ErrorCode::InferenceFailed => "Model inference failed during generation",
            ErrorCode::EncodeFailed => "Failed to encode processed audio to a delivery format",
            ErrorCode::InvalidConfig => "Pipeline configuration is invalid",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPrompt => {
                "Provide a descriptive prompt between 1 and 1000 characters \
                 (e.g., 'slow jazz piano with soft drums')"
            }
            ErrorCode::UnknownModel => {
                "Register a model for every route (general, percussion, piano, hybrid) \
                 before starting the pipeline"
            }
            ErrorCode::InferenceFailed => {
                "Retry the request, reduce the requested duration, or check the model backend logs"
            }
            ErrorCode::EncodeFailed => {
                "Check disk space and output directory permissions; for mp3/ogg make sure \
                 ffmpeg is installed and on PATH"
            }
            ErrorCode::InvalidConfig => {
                "Check CLIPFORGE_* environment variables and the parameter file \
                 (it must define general, percussion, piano and hybrid)"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for pipeline operations.
#[derive(Debug)]
pub struct PipelineError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PipelineError {
    /// Creates a new PipelineError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new PipelineError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INVALID_PROMPT error for prompts that are empty after sanitization.
    pub fn empty_prompt() -> Self {
        Self::new(ErrorCode::InvalidPrompt, "Prompt cannot be empty")
    }

    /// Creates an INVALID_PROMPT error for prompts that are too long.
    pub fn prompt_too_long(len: usize) -> Self {
        Self::new(
            ErrorCode::InvalidPrompt,
            format!("Prompt too long: {} characters (maximum 1000)", len),
        )
    }

    /// Creates an UNKNOWN_MODEL error.
    pub fn unknown_model(model: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnknownModel,
            format!("No model registered for route '{}'", model),
        )
    }

    /// Creates an INFERENCE_FAILED error wrapping a model error.
    pub fn inference_failed(
        model: impl fmt::Display,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            code: ErrorCode::InferenceFailed,
            message: format!("Model '{}' failed: {}", model, source),
            source: Some(source),
        }
    }

    /// Creates an ENCODE_FAILED error.
    pub fn encode_failed(format: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::EncodeFailed,
            format!("Failed to encode {}: {}", format, reason.into()),
        )
    }

    /// Creates an INVALID_CONFIG error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfig,
            format!("Invalid configuration: {}", reason.into()),
        )
    }

    /// Returns true if this error was caused by the caller's input.
    pub fn is_input_error(&self) -> bool {
        self.code == ErrorCode::InvalidPrompt
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using PipelineError.
pub type Result<T> = std::result::Result<T, PipelineError>;
