//! RFB front-end - query-string driven viewer for VNC over WebSocket.
//!
//! This library connects an embedded remote-framebuffer client to a server
//! reachable through a WebSocket tunnel (typically websockify). All
//! connection parameters come from the hosting page's query string.
//!
//! # Architecture
//!
//! Two components, in strict dependency order:
//!
//! - **Configuration Resolver** ([`config`]): page location + query string
//!   → immutable [`ConnectionConfig`]. Pure, never fails.
//! - **Session Controller** ([`session`]): mounts the embedded client,
//!   reduces its lifecycle events to `Connecting` / `Connected` / `Failed`,
//!   and decides what the view renders.
//!
//! The protocol implementation itself stays behind the
//! [`ClientConnector`] / [`RemoteClient`] adapter traits. [`Tunnel`]
//! provides the WebSocket endpoint and sub-protocol framing such an
//! implementation runs on.
//!
//! # Quick Start
//!
//! ```ignore
//! use rfb_frontend::{MemoryHost, Result, Session, SessionAction};
//! use tokio::sync::mpsc;
//!
//! async fn view(connector: impl rfb_frontend::ClientConnector + 'static) -> Result<()> {
//!     let mut session = Session::builder()
//!         .page_url("https://viewer.example.com/?hostname=desk&port=6080&password=secret")
//!         .connector(connector)
//!         .host(MemoryHost::new())
//!         .allow_protocol_switch(true)
//!         .mount()
//!         .await?;
//!
//!     let (actions, action_rx) = mpsc::unbounded_channel::<SessionAction>();
//!     let mut states = session.subscribe();
//!     tokio::spawn(async move { session.run(action_rx).await });
//!
//!     states.changed().await.ok();
//!     println!("{:?}", states.borrow().status);
//!     drop(actions);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Environment capture and connection resolution |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Messages exchanged with the embedded client |
//! | [`session`] | Session controller, state and view decision |
//! | [`transport`] | WebSocket tunnel |

// ============================================================================
// Modules
// ============================================================================

/// Configuration Resolver.
///
/// Use [`config::resolve`] to turn an [`Environment`] into a
/// [`ConnectionConfig`].
pub mod config;

/// Error types and result aliases.
pub mod error;

/// Messages exchanged with the embedded client.
pub mod protocol;

/// Session Controller.
///
/// Use [`Session::builder()`] to mount a session.
pub mod session;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Config types
pub use config::{
    ConnectionConfig, Credentials, DisplayOptions, Environment, PageLocation, QueryParams,
    SubProtocol,
};

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{ClientEvent, ClientInit, ConnectionOptions, CredentialsPayload, ParsedEvent};

// Session types
pub use session::{
    ClientConnector, DisconnectPolicy, EventSink, Failure, MemoryHost, PageHost, RemoteClient,
    Session, SessionAction, SessionBuilder, SessionState, SessionStatus, View,
};

// Transport types
pub use transport::Tunnel;
