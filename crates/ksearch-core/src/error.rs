//! Error types for the ksearch client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire ksearch client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum KsearchError {
    /// A single stream event could not be decoded into a known message.
    #[error("Malformed stream message: {0}")]
    MalformedMessage(String),

    /// The progress stream connection failed or ended unexpectedly
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP response from the search service
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Caller supplied input that cannot be sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KsearchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a MalformedMessage error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a MalformedMessage error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedMessage(_))
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the message suitable for a user-facing error banner.
    ///
    /// HTTP failures surface the server's own error text; everything else
    /// uses the full display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KsearchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for KsearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KsearchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, KsearchError>`.
pub type Result<T> = std::result::Result<T, KsearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = KsearchError::http(500, "Processing error: boom");
        assert_eq!(err.user_message(), "Processing error: boom");
        assert_eq!(err.to_string(), "HTTP 500: Processing error: boom");
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: KsearchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            KsearchError::Serialization { ref format, .. } if format == "JSON"
        ));
    }

    #[test]
    fn test_type_checks() {
        assert!(KsearchError::malformed("x").is_malformed());
        assert!(KsearchError::transport("x").is_transport());
        assert!(!KsearchError::config("x").is_transport());
    }
}
