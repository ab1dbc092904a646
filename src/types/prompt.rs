//! Prompt sanitization.
//!
//! A raw prompt is never mutated; sanitizing it yields a [`CleanPrompt`],
//! which is the only form the analyzer, router and cache ever see.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Maximum prompt length in characters after sanitization.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// A prompt after trimming and validation.
///
/// Whitespace runs are collapsed to a single space and control characters
/// are removed, so two prompts that differ only in whitespace sanitize to
/// the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanPrompt(String);

impl CleanPrompt {
    /// Sanitizes a raw prompt.
    ///
    /// Fails with `INVALID_PROMPT` if nothing remains or the result is
    /// longer than [`MAX_PROMPT_CHARS`].
    pub fn sanitize(raw: &str) -> Result<Self> {
        let cleaned = raw
            .split_whitespace()
            .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if cleaned.is_empty() {
            return Err(PipelineError::empty_prompt());
        }

        let len = cleaned.chars().count();
        if len > MAX_PROMPT_CHARS {
            return Err(PipelineError::prompt_too_long(len));
        }

        Ok(Self(cleaned))
    }

    /// Returns the sanitized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the sanitized text lowercased, for keyword matching.
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for CleanPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CleanPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn trims_and_collapses_whitespace() {
        let a = CleanPrompt::sanitize("  slow   jazz\tpiano \n").unwrap();
        let b = CleanPrompt::sanitize("slow jazz piano").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "slow jazz piano");
    }

    #[test]
    fn strips_control_characters() {
        let p = CleanPrompt::sanitize("lofi\u{7}beats").unwrap();
        assert_eq!(p.as_str(), "lofibeats");
    }

    #[test]
    fn rejects_empty_prompt() {
        let err = CleanPrompt::sanitize("   \t\n ").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrompt);
    }

    #[test]
    fn rejects_long_prompt() {
        let raw = "a".repeat(MAX_PROMPT_CHARS + 1);
        let err = CleanPrompt::sanitize(&raw).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrompt);

        let ok = "a".repeat(MAX_PROMPT_CHARS);
        assert!(CleanPrompt::sanitize(&ok).is_ok());
    }

    #[test]
    fn preserves_case() {
        let p = CleanPrompt::sanitize("Upbeat Rock").unwrap();
        assert_eq!(p.as_str(), "Upbeat Rock");
        assert_eq!(p.to_lowercase(), "upbeat rock");
    }
}
