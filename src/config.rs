//! Client configuration and builder.
//!
//! Provides a fluent API for configuring a [`RealtimeClient`].
//!
//! # Example
//!
//! ```no_run
//! use chatlink::ClientConfig;
//!
//! # fn example() -> chatlink::Result<()> {
//! let config = ClientConfig::builder()
//!     .endpoint("ws://chat.example:8000/ws")
//!     .retry_budget(3)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`RealtimeClient`]: crate::RealtimeClient

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{BinaryCodec, FrameCodec};

// ============================================================================
// Constants
// ============================================================================

/// Default realtime endpoint.
const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws";

/// Default maximum number of automatic reconnection attempts.
const DEFAULT_RETRY_BUDGET: u32 = 5;

/// Default fixed delay between reconnection attempts.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(3000);

// ============================================================================
// ClientConfig
// ============================================================================

/// Validated configuration for a [`RealtimeClient`].
///
/// Use [`ClientConfig::builder()`] to create one.
///
/// [`RealtimeClient`]: crate::RealtimeClient
#[derive(Clone)]
pub struct ClientConfig {
    /// Realtime endpoint, e.g. `ws://localhost:8000/ws`.
    endpoint: Url,
    /// Maximum automatic reconnection attempts before giving up.
    retry_budget: u32,
    /// Fixed delay between reconnection attempts.
    retry_backoff: Duration,
    /// Binary frame codec; `None` selects the JSON text-frame fallback.
    codec: Option<Arc<dyn FrameCodec>>,
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the configured endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the reconnection budget.
    #[inline]
    #[must_use]
    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Returns the reconnection backoff interval.
    #[inline]
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Returns `true` when a binary frame codec is configured.
    #[inline]
    #[must_use]
    pub fn has_codec(&self) -> bool {
        self.codec.is_some()
    }

    /// Returns the configured frame codec, if any.
    #[inline]
    pub(crate) fn codec(&self) -> Option<&Arc<dyn FrameCodec>> {
        self.codec.as_ref()
    }

    /// Builds the per-session connection URL.
    ///
    /// Format: `<endpoint>?user=<identity>` with the identity
    /// percent-encoded.
    #[must_use]
    pub(crate) fn session_url(&self, identity: &str) -> String {
        format!(
            "{}?user={}",
            self.endpoint.as_str().trim_end_matches('/'),
            urlencoding::encode(identity)
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("retry_budget", &self.retry_budget)
            .field("retry_backoff", &self.retry_backoff)
            .field("codec", &self.codec.is_some())
            .finish()
    }
}

// ============================================================================
// CodecChoice
// ============================================================================

/// Builder-internal codec selection.
enum CodecChoice {
    /// Built-in binary schema codec.
    Binary,
    /// JSON text frames only (debug fallback).
    JsonOnly,
    /// Caller-supplied codec.
    Custom(Arc<dyn FrameCodec>),
}

// ============================================================================
// ClientConfigBuilder
// ============================================================================

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    retry_budget: u32,
    retry_backoff: Duration,
    codec: CodecChoice,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    /// Creates a builder with the default endpoint, retry policy and the
    /// built-in binary codec.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoint: None,
            retry_budget: DEFAULT_RETRY_BUDGET,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            codec: CodecChoice::Binary,
        }
    }

    /// Sets the realtime endpoint (`ws://` or `wss://`).
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the maximum number of automatic reconnection attempts.
    ///
    /// Zero disables automatic reconnection entirely.
    #[inline]
    #[must_use]
    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Sets the fixed delay between reconnection attempts.
    #[inline]
    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Replaces the built-in binary codec with a caller-supplied one.
    #[inline]
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn FrameCodec>) -> Self {
        self.codec = CodecChoice::Custom(codec);
        self
    }

    /// Disables the binary schema; all frames become UTF-8 JSON text.
    ///
    /// Debug fallback only; production servers speak the binary schema.
    #[inline]
    #[must_use]
    pub fn json_only(mut self) -> Self {
        self.codec = CodecChoice::JsonOnly;
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the endpoint is not a valid `ws`/`wss`
    /// URL or already carries a query string.
    pub fn build(self) -> Result<ClientConfig> {
        let raw = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);

        let endpoint = Url::parse(raw)
            .map_err(|e| Error::config(format!("invalid endpoint `{raw}`: {e}")))?;

        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "endpoint scheme must be ws or wss, got `{}`",
                endpoint.scheme()
            )));
        }

        if endpoint.query().is_some() {
            return Err(Error::config(
                "endpoint must not carry a query string; \
                 the client appends `?user=<identity>` itself",
            ));
        }

        let codec: Option<Arc<dyn FrameCodec>> = match self.codec {
            CodecChoice::Binary => Some(Arc::new(BinaryCodec)),
            CodecChoice::JsonOnly => None,
            CodecChoice::Custom(codec) => Some(codec),
        };

        Ok(ClientConfig {
            endpoint,
            retry_budget: self.retry_budget,
            retry_backoff: self.retry_backoff,
            codec,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
