//! WebSocket transport layer.
//!
//! The remote-framebuffer byte stream travels over a single WebSocket
//! endpoint (typically a websockify bridge in front of the VNC server).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Embedded       │         WebSocket            │  websockify     │
//! │  client         │◄────────────────────────────►│  bridge         │──► VNC server
//! │  → Tunnel       │   Sec-WebSocket-Protocol     │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Tunnel Lifecycle
//!
//! 1. `Tunnel::open` - Handshake advertising `text` or `binary`
//! 2. `Tunnel::send` / `Tunnel::recv` - Framed byte stream
//! 3. `Tunnel::close` - Close frame

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket tunnel and sub-protocol framing.
pub mod tunnel;

// ============================================================================
// Re-exports
// ============================================================================

pub use tunnel::{SEC_WEBSOCKET_PROTOCOL, Tunnel};
