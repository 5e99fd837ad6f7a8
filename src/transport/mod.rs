//! Realtime transport layer.
//!
//! This module owns the WebSocket plumbing: one [`RealtimeClient`] holds at
//! most one live connection, decodes inbound frames and fans events out to
//! subscribed listeners.
//!
//! ```text
//! ┌──────────────┐   events    ┌─────────────────┐   WebSocket   ┌────────┐
//! │ application  │◄────────────│ RealtimeClient  │◄─────────────►│ server │
//! │ (stores, UI) │  send_*     │  + socket task  │  binary/text  │  /ws   │
//! └──────────────┘────────────►└─────────────────┘               └────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Client, lifecycle state machine, reconnection |
//! | `events` | Event kinds, payloads and the listener registry |

// ============================================================================
// Submodules
// ============================================================================

/// Realtime client and connection lifecycle.
pub mod connection;

/// Lifecycle and message event dispatch.
pub mod events;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{ConnectionState, RealtimeClient};
pub use events::{EventKind, ListenerId, TransportEvent};
