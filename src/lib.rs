//! Chatlink - realtime transport client for chat services.
//!
//! This library maintains one logical WebSocket connection per client
//! session, encodes outgoing chat messages into a compact binary wire format
//! (with a JSON debug fallback), decodes incoming frames back into typed
//! messages, and recovers transparently from unexpected disconnects up to a
//! bounded retry budget.
//!
//! # Architecture
//!
//! - The [`RealtimeClient`] owns the socket exclusively; consumers never
//!   touch the transport directly
//! - Lifecycle and message notifications flow through an ordered listener
//!   registry (`connected`, `disconnected`, `message`, `error`)
//! - Binary frames carry a fixed 8-field schema; the field tags are the
//!   compatibility contract with the server
//! - No public method fails synchronously: errors surface as events or logs
//! - A thin REST client ([`ChatApi`]) covers the non-realtime fallback path
//!
//! # Quick Start
//!
//! ```no_run
//! use chatlink::{ChatMessage, ClientConfig, EventKind, RealtimeClient, TransportEvent};
//!
//! #[tokio::main]
//! async fn main() -> chatlink::Result<()> {
//!     let config = ClientConfig::builder()
//!         .endpoint("ws://localhost:8000/ws")
//!         .build()?;
//!     let client = RealtimeClient::new(config);
//!
//!     client.on(EventKind::Message, |event| {
//!         if let TransportEvent::Message(message) = event {
//!             println!("{}: {}", message.from, message.content);
//!         }
//!     });
//!
//!     client.connect("alice").await;
//!     client.send_message(&ChatMessage::text("alice", "bob", "hello"));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | REST fallback client for the chat endpoints |
//! | [`config`] | Client configuration and builder |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Message type and frame codec |
//! | [`transport`] | Realtime client, events, reconnection |

// ============================================================================
// Modules
// ============================================================================

/// REST fallback client for the chat endpoints.
///
/// Used when the realtime socket is not connected.
pub mod api;

/// Client configuration and builder.
///
/// Use [`ClientConfig::builder()`] to create a configured client.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Wire protocol message types and frame codec.
///
/// [`ChatMessage`], the binary schema codec and the JSON fallback.
pub mod protocol;

/// Realtime transport layer.
///
/// [`RealtimeClient`], event dispatch and the reconnection policy.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// API types
pub use api::{ChatApi, GroupRecord, MessageQuery, MessageRecord, NewGroup};

// Configuration types
pub use config::{ClientConfig, ClientConfigBuilder};

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{BinaryCodec, ChatMessage, ContentKind, FrameCodec, MessageKind};

// Transport types
pub use transport::{ConnectionState, EventKind, ListenerId, RealtimeClient, TransportEvent};
