//! Error handling for genesis mining
//!
//! All failure modes are recoverable and reportable: exhaustion of the nonce
//! space and verification mismatches are outcomes the caller decides how to
//! handle, never process-fatal conditions.

use thiserror::Error;

/// Result type alias for genesis mining operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the genesis miner
#[derive(Error, Debug)]
pub enum Error {
    /// A field or length exceeds its fixed-width or length-prefix capacity
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// Target decoding or comparison errors
    #[error("Invalid target: {message}")]
    Target { message: String },

    /// The nonce space was exhausted without satisfying the target
    #[error("Nonce space exhausted after {hashes} hashes without meeting the target")]
    Exhausted { hashes: u64 },

    /// Recomputed hash or proof-of-work does not match the claimed values
    #[error("Verification failed: hash matches: {hash_matches}, target satisfied: {meets_target}")]
    Verification {
        hash_matches: bool,
        meets_target: bool,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cancellation of an in-flight search
    #[error("Operation was cancelled: {operation}")]
    Cancelled { operation: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a target error
    pub fn target(message: impl Into<String>) -> Self {
        Self::Target {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Whether this error is a reportable search outcome rather than a defect
    pub fn is_outcome(&self) -> bool {
        matches!(
            self,
            Error::Exhausted { .. } | Error::Verification { .. } | Error::Cancelled { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Encoding { .. } => "encoding",
            Error::Target { .. } => "target",
            Error::Exhausted { .. } => "exhausted",
            Error::Verification { .. } => "verification",
            Error::Config { .. } => "config",
            Error::Cancelled { .. } => "cancelled",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_message_names_failed_condition() {
        let err = Error::Verification {
            hash_matches: true,
            meets_target: false,
        };
        let msg = err.to_string();
        assert!(msg.contains("hash matches: true"));
        assert!(msg.contains("target satisfied: false"));
    }

    #[test]
    fn test_outcome_classification() {
        assert!(Error::Exhausted { hashes: 42 }.is_outcome());
        assert!(!Error::encoding("too long").is_outcome());
        assert_eq!(Error::config("bad key").category(), "config");
    }
}
