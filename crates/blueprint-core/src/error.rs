//! Error types for Blueprint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Blueprint workspace.
///
/// The three variants that matter to the conversation layer are `Config`
/// (no usable credential), `Delivery` (a single assistant call failed) and
/// `MalformedOutput` (a reply did not have the expected shape). The rest cover
/// the local plumbing around them.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BlueprintError {
    /// Missing or invalid configuration, most commonly the API credential.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request to the assistant failed (network, quota, bad response).
    #[error("Delivery error{}: {message}", .status_code.map(|c| format!(" (HTTP {c})")).unwrap_or_default())]
    Delivery {
        status_code: Option<u16>,
        message: String,
    },

    /// Assistant output did not match an expected structure.
    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    /// An action was invoked in a phase where it is not legal.
    #[error("Action '{action}' is not allowed in phase '{phase}'")]
    InvalidTransition { action: String, phase: String },

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlueprintError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Delivery error
    pub fn delivery(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::Delivery {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a MalformedOutput error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput(message.into())
    }

    /// Creates an InvalidTransition error
    pub fn invalid_transition(action: impl Into<String>, phase: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            action: action.into(),
            phase: phase.to_string(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BlueprintError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BlueprintError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BlueprintError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for BlueprintError {
    fn from(err: minijinja::Error) -> Self {
        Self::Internal(format!("Prompt template failed: {err}"))
    }
}

/// A type alias for `Result<T, BlueprintError>`.
pub type Result<T> = std::result::Result<T, BlueprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_display_with_status() {
        let err = BlueprintError::delivery(Some(429), "RESOURCE_EXHAUSTED: quota");
        assert_eq!(
            err.to_string(),
            "Delivery error (HTTP 429): RESOURCE_EXHAUSTED: quota"
        );
        assert!(err.is_delivery());
    }

    #[test]
    fn test_delivery_display_without_status() {
        let err = BlueprintError::delivery(None, "connection refused");
        assert_eq!(err.to_string(), "Delivery error: connection refused");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BlueprintError = io.into();
        assert!(matches!(err, BlueprintError::Io { .. }));
    }
}
