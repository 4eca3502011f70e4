//! Domain error types
//!
//! This module defines the error hierarchy for Veil. Library code returns
//! [`VeilError`]; the CLI layer adds context with `anyhow`.

use thiserror::Error;

/// Main Veil error type
///
/// The two anonymization failures, [`VeilError::InvalidSpan`] and
/// [`VeilError::DetectionUnavailable`], abort a call before any text is
/// returned. There is no partially anonymized output.
#[derive(Debug, Error)]
pub enum VeilError {
    /// A recognizer produced a span that violates the offset invariants
    #[error("Invalid span [{start}, {end}) for text of length {text_len}: {reason}")]
    InvalidSpan {
        /// Start byte offset reported by the recognizer
        start: usize,
        /// End byte offset reported by the recognizer
        end: usize,
        /// Length in bytes of the text being anonymized
        text_len: usize,
        /// Which invariant was violated
        reason: String,
    },

    /// The detection capability could not be reached or failed
    #[error("Detection unavailable: {0}")]
    DetectionUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl VeilError {
    /// Creates an [`VeilError::InvalidSpan`] error
    pub fn invalid_span(
        start: usize,
        end: usize,
        text_len: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSpan {
            start,
            end,
            text_len,
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised while anonymizing a text, as opposed
    /// to configuration or I/O problems
    pub fn is_anonymization_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpan { .. } | Self::DetectionUnavailable(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self {
        VeilError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}
