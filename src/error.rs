//! Error types for the chat transport client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use chatlink::{ChatApi, Result};
//!
//! async fn example(api: &ChatApi, group: &str) -> Result<()> {
//!     api.join_group(group).await?;
//!     Ok(())
//! }
//! ```
//!
//! Note that the realtime client itself never returns errors from its public
//! methods; failures there are reported through the `error` event or logged.
//! The variants below still classify those failures so listeners can react.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Codec | [`Error::Schema`], [`Error::Encode`], [`Error::Json`], [`Error::Decode`] |
//! | REST fallback | [`Error::Api`], [`Error::Http`] |
//! | External | [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Reported when the connection cannot be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed unexpectedly.
    ///
    /// Reported when the connection is lost during operation.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Frame schema failed to load.
    ///
    /// Fatal to the connection attempt that triggered it.
    #[error("Schema load failed: {message}")]
    Schema {
        /// Description of the schema failure.
        message: String,
    },

    /// Outbound message could not be encoded.
    #[error("Encode failed: {message}")]
    Encode {
        /// Description of the encode failure.
        message: String,
    },

    // ========================================================================
    // REST Fallback Errors
    // ========================================================================
    /// The chat API answered with a non-success envelope.
    #[error("API error (code {code}): {message}")]
    Api {
        /// Envelope `code` field (0 means success).
        code: i32,
        /// Envelope `msg` field.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary frame decode error.
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// HTTP transport error from the REST fallback.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a schema load error.
    #[inline]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates an encode error.
    #[inline]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates an API envelope error.
    #[inline]
    pub fn api(code: i32, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is an encode/decode/schema error.
    #[inline]
    #[must_use]
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::Encode { .. } | Self::Json(_) | Self::Decode(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Connection errors are recoverable through the automatic reconnection
    /// policy; everything else requires caller intervention.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.is_connection_error()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("handshake refused");
        assert_eq!(err.to_string(), "Connection failed: handshake refused");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("bad endpoint");
        assert_eq!(err.to_string(), "Configuration error: bad endpoint");
    }

    #[test]
    fn test_api_error() {
        let err = Error::api(-1, "token expired");
        assert_eq!(err.to_string(), "API error (code -1): token expired");
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("x").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("x").is_connection_error());
        assert!(!Error::api(1, "x").is_connection_error());
    }

    #[test]
    fn test_is_codec_error() {
        assert!(Error::schema("missing descriptor").is_codec_error());
        assert!(Error::encode("x").is_codec_error());
        assert!(!Error::ConnectionClosed.is_codec_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::ConnectionClosed.is_recoverable());
        assert!(!Error::schema("x").is_recoverable());
        assert!(!Error::config("x").is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_codec_error());
    }
}
