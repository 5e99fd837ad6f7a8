//! Wire protocol message types and frame codec.
//!
//! Two frame encodings travel over the same socket:
//!
//! | Encoding | Frame | When |
//! |----------|-------|------|
//! | Binary (protobuf schema) | `Binary` | default, schema loaded |
//! | UTF-8 JSON | `Text` | debug fallback, no schema |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | [`ChatMessage`] and kind discriminators |
//! | `codec` | [`FrameCodec`] seam, [`BinaryCodec`], JSON fallback |

// ============================================================================
// Submodules
// ============================================================================

/// Application-level chat message type.
pub mod message;

/// Binary frame codec and JSON fallback.
pub mod codec;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{BinaryCodec, FrameCodec, decode_json, encode_json};
pub use message::{ChatMessage, ContentKind, MessageKind};
