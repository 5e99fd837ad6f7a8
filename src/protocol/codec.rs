//! Binary frame codec for the realtime wire protocol.
//!
//! Binary frames carry a fixed 8-field protobuf schema. The field tags are
//! the compatibility contract with the server and must not be renumbered:
//!
//! | Field | Type | Tag |
//! |-------|------|-----|
//! | `id` | string | 1 |
//! | `from` | string | 2 |
//! | `to` | string | 3 |
//! | `content` | string | 4 |
//! | `type` | int32 | 5 |
//! | `contentType` | int32 | 6 |
//! | `url` | string | 7 |
//! | `createdAt` | int64 | 8 |
//!
//! The schema layer is pluggable through [`FrameCodec`]; [`BinaryCodec`]
//! is the built-in implementation. When a client is configured without a
//! codec it falls back to UTF-8 JSON text frames ([`encode_json`] /
//! [`decode_json`]), which exists for debugging against servers without the
//! schema.

// ============================================================================
// Imports
// ============================================================================

use prost::Message;

use crate::error::{Error, Result};

use super::message::ChatMessage;

// ============================================================================
// FrameCodec
// ============================================================================

/// Schema-based encoding/decoding of binary frames.
///
/// `load` is the schema initialization step: it runs once per connection
/// attempt, must be idempotent, and a failure aborts the attempt (surfaced
/// through the `error` event). [`BinaryCodec`] compiles its schema in and
/// loads trivially; implement this trait to swap in a different wire schema.
pub trait FrameCodec: Send + Sync {
    /// Initializes the schema. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the schema cannot be initialized.
    fn load(&self) -> Result<()> {
        Ok(())
    }

    /// Encodes a message into a binary frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] when the message cannot be encoded.
    fn encode(&self, message: &ChatMessage) -> Result<Vec<u8>>;

    /// Decodes a binary frame into a message.
    ///
    /// Absent fields decode to defaults, never to errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed frames.
    fn decode(&self, frame: &[u8]) -> Result<ChatMessage>;
}

// ============================================================================
// BinaryCodec
// ============================================================================

/// The built-in codec for the fixed 8-field message schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl FrameCodec for BinaryCodec {
    fn encode(&self, message: &ChatMessage) -> Result<Vec<u8>> {
        let wire = WireMessage::from(message);

        let mut buf = Vec::with_capacity(wire.encoded_len());
        wire.encode(&mut buf)
            .map_err(|e| Error::encode(e.to_string()))?;
        Ok(buf)
    }

    fn decode(&self, frame: &[u8]) -> Result<ChatMessage> {
        let wire = WireMessage::decode(frame)?;
        Ok(wire.into())
    }
}

// ============================================================================
// JSON Fallback
// ============================================================================

/// Encodes a message as a UTF-8 JSON text frame.
///
/// # Errors
///
/// Returns [`Error::Json`] when serialization fails.
pub fn encode_json(message: &ChatMessage) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Parses a UTF-8 JSON text frame into a message.
///
/// # Errors
///
/// Returns [`Error::Json`] for malformed input.
pub fn decode_json(text: &str) -> Result<ChatMessage> {
    Ok(serde_json::from_str(text)?)
}

// ============================================================================
// Wire Representation
// ============================================================================

/// Protobuf wire form of [`ChatMessage`]. Tags are fixed, see module docs.
#[derive(Clone, PartialEq, Message)]
struct WireMessage {
    #[prost(string, tag = "1")]
    id: String,
    #[prost(string, tag = "2")]
    from: String,
    #[prost(string, tag = "3")]
    to: String,
    #[prost(string, tag = "4")]
    content: String,
    #[prost(int32, tag = "5")]
    kind: i32,
    #[prost(int32, tag = "6")]
    content_kind: i32,
    #[prost(string, tag = "7")]
    url: String,
    #[prost(int64, tag = "8")]
    created_at: i64,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            from: message.from.clone(),
            to: message.to.clone(),
            content: message.content.clone(),
            kind: message.kind,
            content_kind: message.content_kind,
            url: message.url.clone(),
            created_at: message.created_at,
        }
    }
}

impl From<WireMessage> for ChatMessage {
    fn from(wire: WireMessage) -> Self {
        Self {
            id: wire.id,
            from: wire.from,
            to: wire.to,
            content: wire.content,
            kind: wire.kind,
            content_kind: wire.content_kind,
            url: wire.url,
            created_at: wire.created_at,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
