//! Session Controller.
//!
//! Mounts one embedded client per attempt, reduces its lifecycle events to
//! a single [`SessionStatus`], and exposes the resulting [`View`].
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Owns the state and the live client |
//! | [`SessionBuilder`] | Fluent configuration and mounting |
//! | [`SessionState`] | Status of one attempt |
//! | [`ClientConnector`] / [`RemoteClient`] | Adapter around the embedded client |
//! | [`PageHost`] | Page title and clipboard side effects |

// ============================================================================
// Submodules
// ============================================================================

/// Builder for mounting sessions.
pub mod builder;

/// Embedded client adapter traits.
pub mod client;

/// Event reduction and lifecycle.
pub mod controller;

/// Hosting-page side effects.
pub mod host;

/// Session state and presentation decision.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SessionBuilder;
pub use client::{ClientConnector, EventSink, EventStream, RemoteClient};
pub use controller::{DisconnectPolicy, Session, SessionAction};
pub use host::{CLIPBOARD_HISTORY_LIMIT, MemoryHost, PageHost};
pub use state::{
    FAILURE_HEADING, Failure, FailureKind, SWITCH_PROTOCOL_LABEL, SessionState, SessionStatus,
    View,
};
