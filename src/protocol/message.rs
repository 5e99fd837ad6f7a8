//! Application-level chat message type.
//!
//! A [`ChatMessage`] is the unit the application hands to the transport and
//! receives back from it. Field names and defaults mirror the wire schema in
//! [`crate::protocol::codec`]: absent fields always come back as empty
//! strings / zero, never as decode errors, which is why `kind` and
//! `content_kind` stay raw integers on the struct. Use [`MessageKind`] and
//! [`ContentKind`] to classify them.

// ============================================================================
// Imports
// ============================================================================

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// MessageKind
// ============================================================================

/// Message kind discriminator (wire field `type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum MessageKind {
    /// Keepalive sentinel, carries no chat content.
    Heartbeat = 0,
    /// Direct message between two users.
    Single = 1,
    /// Message addressed to a group.
    Group = 2,
}

impl MessageKind {
    /// Converts the kind into its wire integer value.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Classifies a wire integer value.
    ///
    /// Returns `None` for values this client does not recognize; the raw
    /// value is still preserved on the message itself.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Heartbeat),
            1 => Some(Self::Single),
            2 => Some(Self::Group),
            _ => None,
        }
    }
}

// ============================================================================
// ContentKind
// ============================================================================

/// Content kind discriminator (wire field `contentType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ContentKind {
    /// Plain text content.
    Text = 1,
    /// Voice clip; `url` points at the recording.
    Voice = 2,
    /// Video clip; `url` points at the recording.
    Video = 3,
}

impl ContentKind {
    /// Converts the kind into its wire integer value.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Classifies a wire integer value.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Text),
            2 => Some(Self::Voice),
            3 => Some(Self::Video),
            _ => None,
        }
    }
}

// ============================================================================
// ChatMessage
// ============================================================================

/// A chat payload exchanged over the realtime transport.
///
/// Construct one with [`ChatMessage::text`] for the common case, or fill the
/// fields directly for anything else. Messages are immutable once handed to
/// the transport; the client never mutates a payload it was given.
///
/// JSON text frames use the same camelCase names as the binary schema:
///
/// ```json
/// {
///   "id": "…", "from": "alice", "to": "bob", "content": "hi",
///   "type": 1, "contentType": 1, "url": "", "createdAt": 1700000000000
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: String,

    /// Sender identity.
    pub from: String,

    /// Recipient identity (user or group).
    pub to: String,

    /// Message body.
    pub content: String,

    /// Message kind, see [`MessageKind`]. Kept raw so unrecognized wire
    /// values survive a round-trip.
    #[serde(rename = "type")]
    pub kind: i32,

    /// Content kind, see [`ContentKind`].
    #[serde(rename = "contentType")]
    pub content_kind: i32,

    /// Attachment URL, empty when the message has no attachment.
    pub url: String,

    /// Creation timestamp, epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl ChatMessage {
    /// Creates a direct text message with a fresh id and current timestamp.
    #[must_use]
    pub fn text(
        from: impl Into<String>,
        to: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            content: content.into(),
            kind: MessageKind::Single.as_i32(),
            content_kind: ContentKind::Text.as_i32(),
            url: String::new(),
            created_at: now_ms(),
        }
    }

    /// Creates the fixed heartbeat sentinel.
    ///
    /// Matches the server contract exactly: kind 0, text content type,
    /// content `"ping"`, everything else left at defaults.
    #[must_use]
    pub fn heartbeat() -> Self {
        Self {
            kind: MessageKind::Heartbeat.as_i32(),
            content_kind: ContentKind::Text.as_i32(),
            content: "ping".to_string(),
            ..Self::default()
        }
    }

    /// Classifies the message kind, `None` when unrecognized.
    #[inline]
    #[must_use]
    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::from_i32(self.kind)
    }

    /// Classifies the content kind, `None` when unrecognized.
    #[inline]
    #[must_use]
    pub fn content_kind(&self) -> Option<ContentKind> {
        ContentKind::from_i32(self.content_kind)
    }

    /// Returns `true` if this is the heartbeat sentinel.
    #[inline]
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        self.kind == MessageKind::Heartbeat.as_i32()
    }
}

/// Current time in millis since the Unix epoch.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message() {
        let msg = ChatMessage::text("alice", "bob", "hello");
        assert!(!msg.id.is_empty());
        assert_eq!(msg.from, "alice");
        assert_eq!(msg.to, "bob");
        assert_eq!(msg.message_kind(), Some(MessageKind::Single));
        assert_eq!(msg.content_kind(), Some(ContentKind::Text));
        assert!(msg.created_at > 0);
        assert!(!msg.is_heartbeat());
    }

    #[test]
    fn test_heartbeat_sentinel() {
        let hb = ChatMessage::heartbeat();
        assert_eq!(hb.kind, 0);
        assert_eq!(hb.content_kind, 1);
        assert_eq!(hb.content, "ping");
        assert!(hb.id.is_empty());
        assert_eq!(hb.created_at, 0);
        assert!(hb.is_heartbeat());
    }

    #[test]
    fn test_kind_conversions() {
        assert_eq!(MessageKind::Group.as_i32(), 2);
        assert_eq!(MessageKind::from_i32(0), Some(MessageKind::Heartbeat));
        assert_eq!(MessageKind::from_i32(99), None);
        assert_eq!(ContentKind::from_i32(3), Some(ContentKind::Video));
        assert_eq!(ContentKind::from_i32(0), None);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let msg = ChatMessage {
            kind: 42,
            ..ChatMessage::default()
        };
        assert_eq!(msg.message_kind(), None);
        assert_eq!(msg.kind, 42);
    }

    #[test]
    fn test_json_field_names() {
        let msg = ChatMessage::text("alice", "bob", "hello");
        let json = serde_json::to_string(&msg).expect("serialize");

        assert!(json.contains("\"type\""));
        assert!(json.contains("\"contentType\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"kind\""));
        assert!(!json.contains("\"content_kind\""));
    }

    #[test]
    fn test_partial_json_decodes_to_defaults() {
        let msg: ChatMessage = serde_json::from_str(r#"{"content":"hi"}"#).expect("parse");
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.id, "");
        assert_eq!(msg.kind, 0);
        assert_eq!(msg.created_at, 0);
    }
}
