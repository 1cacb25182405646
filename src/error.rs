//! Decodex error types.
//!
//! # Fatal vs. Degrading Errors
//!
//! Only caller-level pre-checks are fatal and escape the public entry points:
//!
//! - [`DecodeError::InputTooLarge`]: input exceeds `max_input_size`
//! - [`DecodeError::SecurityRejected`]: input exceeds the hard size ceiling
//! - [`DecodeError::InvalidInput`] / [`DecodeError::Config`]: caller mistakes
//!
//! Everything raised inside the detection loop ([`DecodeError::PatternError`],
//! [`DecodeError::TimeoutExceeded`]) is caught, logged, and rendered into the
//! `warnings` of the affected result. Those variants exist so the loop has a
//! typed value to format, not so callers can match on them.

use std::time::Instant;

use thiserror::Error;

/// Decodex errors.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Input exceeds the configured maximum size.
    #[error("Input too large: {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge {
        /// Observed input size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Input rejected by a caller-level pre-check.
    #[error("Input rejected: {0}")]
    SecurityRejected(String),

    /// A single pattern's validator or decoder failed.
    #[error("Pattern {pattern} failed: {message}")]
    PatternError {
        /// Pattern name.
        pattern: String,
        /// Failure description.
        message: String,
    },

    /// A validator, layer or strategy ran past its time budget.
    #[error("Timeout exceeded in {stage} (budget {budget_ms} ms)")]
    TimeoutExceeded {
        /// What was running (pattern name, layer number, strategy).
        stage: String,
        /// Budget that was exceeded.
        budget_ms: u64,
    },

    /// Malformed caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pattern name not present in the registry.
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Whether this error aborts a call instead of degrading to fewer candidates.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DecodeError::PatternError { .. } | DecodeError::TimeoutExceeded { .. }
        )
    }
}

/// Result type alias for Decodex operations
pub type Result<T> = std::result::Result<T, DecodeError>;

impl From<toml::de::Error> for DecodeError {
    fn from(err: toml::de::Error) -> Self {
        DecodeError::Config(format!("Failed to parse config: {err}"))
    }
}

/// A brute-force search ran past its deadline before finishing.
///
/// Carries no budget: the caller that set the deadline knows it and turns
/// this into [`DecodeError::TimeoutExceeded`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

/// `Err` once `deadline` has passed; `None` never expires
pub(crate) fn check_deadline(
    deadline: Option<Instant>,
) -> std::result::Result<(), DeadlineExceeded> {
    match deadline {
        Some(at) if Instant::now() >= at => Err(DeadlineExceeded),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let too_large = DecodeError::InputTooLarge {
            size: 20,
            limit: 10,
        };
        assert!(too_large.is_fatal());

        let pattern = DecodeError::PatternError {
            pattern: "Base64".to_string(),
            message: "bad padding".to_string(),
        };
        assert!(!pattern.is_fatal());

        let timeout = DecodeError::TimeoutExceeded {
            stage: "layer 3".to_string(),
            budget_ms: 5000,
        };
        assert!(!timeout.is_fatal());
    }

    #[test]
    fn test_display_messages() {
        let err = DecodeError::InputTooLarge {
            size: 2048,
            limit: 1024,
        };
        assert_eq!(
            err.to_string(),
            "Input too large: 2048 bytes exceeds limit of 1024 bytes"
        );

        let err = DecodeError::TimeoutExceeded {
            stage: "Base58".to_string(),
            budget_ms: 250,
        };
        assert!(err.to_string().contains("Base58"));
    }

    #[test]
    fn test_toml_error_converts_to_config() {
        let parse_err = toml::from_str::<toml::Value>("key = ").unwrap_err();
        let err: DecodeError = parse_err.into();
        assert!(matches!(err, DecodeError::Config(_)));
        assert!(err.to_string().contains("Failed to parse config"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_check_deadline() {
        assert_eq!(check_deadline(None), Ok(()));
        assert_eq!(check_deadline(Some(Instant::now())), Err(DeadlineExceeded));
        let later = Instant::now().checked_add(std::time::Duration::from_secs(60));
        assert_eq!(check_deadline(later), Ok(()));
    }
}
