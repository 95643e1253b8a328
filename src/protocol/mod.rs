//! Messages exchanged with the embedded client.
//!
//! # Message Types
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `ClientInit` | Controller → Client | Construct and connect |
//! | `ClientEvent` | Client → Controller | Lifecycle notification |
//! | `CredentialsPayload` | Controller → Client | Answer a credential prompt |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Initialisation bag and credential payload |
//! | `event` | Raw and parsed lifecycle events |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound messages.
pub mod command;

/// Lifecycle event types.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{ClientInit, ConnectionOptions, CredentialsPayload, DEFAULT_BACKGROUND, RfbOptions};
pub use event::{ClientEvent, ParsedEvent};
