//! Adapter seam around the embedded protocol client.
//!
//! The controller never touches the protocol implementation directly. A
//! [`ClientConnector`] constructs one [`RemoteClient`] per session attempt
//! and hands it an [`EventSink`] for lifecycle events. Replacing the client
//! means dropping the old handle and connecting a new one.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::Result;
use crate::protocol::{ClientEvent, ClientInit, CredentialsPayload};

// ============================================================================
// Types
// ============================================================================

/// Receiving half of a client's event channel.
pub type EventStream = mpsc::UnboundedReceiver<ClientEvent>;

// ============================================================================
// EventSink
// ============================================================================

/// Sending half of a client's event channel.
///
/// Cloneable; events sent after the session dropped the client are
/// discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl EventSink {
    /// Creates a connected sink/stream pair.
    #[must_use]
    pub fn channel() -> (Self, EventStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Delivers an event. Returns `false` if the session stopped listening.
    pub fn emit(&self, event: ClientEvent) -> bool {
        trace!(event_type = %event.event_type, "Client event emitted");
        self.tx.send(event).is_ok()
    }

    /// Returns `true` if the session no longer listens to this client.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// RemoteClient
// ============================================================================

/// A live embedded client instance.
pub trait RemoteClient: Send {
    /// Supplies credentials after a `credentialsrequired` event.
    ///
    /// # Errors
    ///
    /// Implementation-specific; the controller logs and ignores failures.
    fn send_credentials(&mut self, credentials: &CredentialsPayload) -> Result<()>;

    /// Releases the client. Called once before the handle is dropped.
    fn disconnect(&mut self) {}
}

// ============================================================================
// ClientConnector
// ============================================================================

/// Factory for embedded client instances.
#[async_trait]
pub trait ClientConnector: Send + Sync {
    /// Constructs a client for `init` and starts connecting.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    async fn connect(&self, init: ClientInit, events: EventSink) -> Result<Box<dyn RemoteClient>>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sink_delivers_in_order() {
        let (sink, mut stream) = EventSink::channel();

        assert!(sink.emit(ClientEvent::connect()));
        assert!(sink.emit(ClientEvent::desktop_name("desk")));

        assert_eq!(stream.recv().await, Some(ClientEvent::connect()));
        assert_eq!(stream.recv().await, Some(ClientEvent::desktop_name("desk")));
    }

    #[test]
    fn test_sink_reports_dropped_session() {
        let (sink, stream) = EventSink::channel();
        drop(stream);

        assert!(sink.is_closed());
        assert!(!sink.emit(ClientEvent::connect()));
    }
}
