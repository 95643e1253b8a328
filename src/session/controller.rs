//! Session Controller.
//!
//! Owns one [`SessionState`] and at most one live embedded client, reduces
//! client events to a status, and publishes every change on a
//! [`watch`] channel for the presentation layer.
//!
//! # Event Reduction
//!
//! | Event | Effect |
//! |-------|--------|
//! | `connect` | `Connecting` → `Connected` |
//! | `credentialsrequired` | Supply configured credentials, or fail |
//! | `securityfailure` | Fail with status and reason |
//! | `desktopname` | Set the page title (non-empty names only) |
//! | `clipboard` | Write the platform clipboard (non-empty text only) |
//! | `disconnect` | Nothing, unless [`DisconnectPolicy::Fail`] |
//!
//! There is no automatic reconnection. A failed session stays failed until
//! it is remounted or the user switches protocol.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::protocol::{ClientEvent, ClientInit, CredentialsPayload, ParsedEvent};

use super::builder::SessionBuilder;
use super::client::{ClientConnector, EventSink, EventStream, RemoteClient};
use super::host::PageHost;
use super::state::{Failure, SessionState, SessionStatus, View};

// ============================================================================
// DisconnectPolicy
// ============================================================================

/// How the controller treats a `disconnect` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// Log and otherwise ignore it. The session silently goes dead.
    #[default]
    Ignore,

    /// Fail with "Disconnected (cannot reconnect)", applied after the event
    /// handler has returned so the client is never touched mid-dispatch.
    Fail,
}

// ============================================================================
// SessionAction
// ============================================================================

/// User actions fed into [`Session::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Toggle the sub-protocol and start a fresh session.
    SwitchProtocol,
}

/// One iteration of the run loop.
enum Step {
    Action(Option<SessionAction>),
    Event(Option<ClientEvent>),
}

// ============================================================================
// Session
// ============================================================================

/// A mounted viewer session.
///
/// Created through [`Session::builder`].
pub struct Session {
    /// Configuration of the current attempt.
    config: ConnectionConfig,
    /// Factory for embedded clients.
    connector: Arc<dyn ClientConnector>,
    /// Hosting-page side effects.
    host: Box<dyn PageHost>,
    /// The live client, if any.
    client: Option<Box<dyn RemoteClient>>,
    /// Events from the live client.
    events: Option<EventStream>,
    /// State of the current attempt.
    state: SessionState,
    /// Publishes state to the presentation layer.
    state_tx: watch::Sender<SessionState>,
    /// Whether the failure panel offers a protocol switch.
    allow_protocol_switch: bool,
    /// Reaction to `disconnect`.
    disconnect_policy: DisconnectPolicy,
    /// Disconnect observed during dispatch, not yet applied.
    disconnect_pending: bool,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("has_client", &self.client.is_some())
            .field("allow_protocol_switch", &self.allow_protocol_switch)
            .field("disconnect_policy", &self.disconnect_policy)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Session - Lifecycle
// ============================================================================

impl Session {
    /// Creates a new session builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Mounts a session: fails immediately without a URL, otherwise
    /// constructs the client and enters `Connecting`.
    pub(crate) async fn mount(
        config: ConnectionConfig,
        connector: Arc<dyn ClientConnector>,
        host: Box<dyn PageHost>,
        allow_protocol_switch: bool,
        disconnect_policy: DisconnectPolicy,
    ) -> Self {
        let state = SessionState::connecting(config.sub_protocol());
        let (state_tx, _) = watch::channel(state.clone());

        let mut session = Self {
            config,
            connector,
            host,
            client: None,
            events: None,
            state,
            state_tx,
            allow_protocol_switch,
            disconnect_policy,
            disconnect_pending: false,
        };
        session.start().await;
        session
    }

    /// Starts the current attempt.
    async fn start(&mut self) {
        if self.config.is_missing_url() {
            self.fail(Failure::NoUrl);
            return;
        }

        if let Err(e) = self.config.display().validate() {
            warn!(error = %e, "Display option out of range, forwarding anyway");
        }

        info!(
            session_id = %self.state.id,
            url = %self.config.url(),
            sub_protocol = %self.config.sub_protocol(),
            "Connecting"
        );

        let (sink, stream) = EventSink::channel();
        let init = ClientInit::from_config(&self.config);

        match self.connector.connect(init, sink).await {
            Ok(client) => {
                self.client = Some(client);
                self.events = Some(stream);
            }
            Err(e) => self.fail(Failure::ConnectFailed {
                message: e.to_string(),
            }),
        }
    }

    /// Discards the current client and starts over with the other
    /// sub-protocol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if protocol switching is not enabled.
    pub async fn switch_protocol(&mut self) -> Result<()> {
        if !self.allow_protocol_switch {
            return Err(Error::config("Protocol switching is disabled"));
        }

        let next = self.config.sub_protocol().toggled();
        info!(from = %self.config.sub_protocol(), to = %next, "Switching protocol");

        self.release_client();
        self.config = self.config.with_sub_protocol(next);
        self.state = SessionState::connecting(next);
        self.state_tx.send_replace(self.state.clone());

        self.start().await;
        Ok(())
    }

    /// Drives the session until `actions` closes.
    ///
    /// Client events and user actions are processed one at a time, each
    /// to completion.
    pub async fn run(&mut self, mut actions: mpsc::UnboundedReceiver<SessionAction>) {
        loop {
            let step = tokio::select! {
                action = actions.recv() => Step::Action(action),
                event = recv_event(self.events.as_mut()) => Step::Event(event),
            };

            match step {
                Step::Action(Some(SessionAction::SwitchProtocol)) => {
                    if let Err(e) = self.switch_protocol().await {
                        warn!(error = %e, "Protocol switch ignored");
                    }
                }

                Step::Action(None) => {
                    debug!("Action channel closed");
                    break;
                }

                Step::Event(Some(event)) => {
                    self.handle_event(event);
                    self.apply_deferred();
                }

                Step::Event(None) => {
                    debug!("Client event channel closed");
                    self.events = None;
                }
            }
        }
    }

    /// Waits for and processes one client event.
    ///
    /// Returns `false` if there is no live client to listen to.
    pub async fn next_event(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };

        match events.recv().await {
            Some(event) => {
                self.handle_event(event);
                self.apply_deferred();
                true
            }
            None => {
                debug!("Client event channel closed");
                self.events = None;
                false
            }
        }
    }
}

// ============================================================================
// Session - Event Reduction
// ============================================================================

impl Session {
    /// Reduces one client event. Events after a failure are ignored.
    pub fn handle_event(&mut self, event: ClientEvent) {
        if self.state.is_failed() {
            debug!(event_type = %event.event_type, "Ignoring event on failed session");
            return;
        }

        debug!(session_id = %self.state.id, event_type = %event.event_type, "Client event received");

        match event.parse() {
            ParsedEvent::Connected => {
                if self.state.is_connecting() {
                    self.set_status(SessionStatus::Connected);
                }
            }

            ParsedEvent::CredentialsRequired { types } => {
                debug!(?types, "Credentials requested");
                self.supply_credentials();
            }

            ParsedEvent::SecurityFailure { status, reason } => {
                self.fail(Failure::Security { status, reason });
            }

            ParsedEvent::DesktopName { name } => match name.filter(|n| !n.is_empty()) {
                Some(name) => {
                    debug!(%name, "Desktop name changed");
                    self.host.set_title(&name);
                }
                None => debug!("Empty desktop name, title unchanged"),
            },

            ParsedEvent::Clipboard { text } => {
                if let Some(text) = text.filter(|t| !t.is_empty()) {
                    debug!(len = text.len(), "Clipboard updated");
                    self.host.write_clipboard(&text);
                }
            }

            ParsedEvent::Disconnected { clean } => match self.disconnect_policy {
                DisconnectPolicy::Ignore => debug!(?clean, "Disconnect not handled"),
                DisconnectPolicy::Fail => self.disconnect_pending = true,
            },

            ParsedEvent::Unknown { event_type, .. } => {
                debug!(%event_type, "Unhandled client event");
            }
        }
    }

    /// Applies transitions deferred past event dispatch.
    pub fn apply_deferred(&mut self) {
        if std::mem::take(&mut self.disconnect_pending) && !self.state.is_failed() {
            self.fail(Failure::Disconnected);
        }
    }

    /// Answers a credential prompt from the configuration.
    fn supply_credentials(&mut self) {
        let Some(payload) = CredentialsPayload::from_credentials(self.config.credentials()) else {
            self.fail(Failure::PasswordRequired);
            return;
        };

        let Some(client) = self.client.as_mut() else {
            warn!("Credentials requested with no live client");
            return;
        };

        debug!(with_username = payload.username.is_some(), "Sending credentials");
        if let Err(e) = client.send_credentials(&payload) {
            warn!(error = %e, "Failed to send credentials");
        }
    }

    /// Enters the terminal state and unmounts the client.
    fn fail(&mut self, failure: Failure) {
        info!(
            session_id = %self.state.id,
            kind = ?failure.kind(),
            reason = %failure,
            "Session failed"
        );
        self.release_client();
        self.set_status(SessionStatus::Failed(failure));
    }

    /// Drops the live client and its event stream.
    fn release_client(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.disconnect();
        }
        self.events = None;
        self.disconnect_pending = false;
    }

    /// Updates and publishes the status.
    fn set_status(&mut self, status: SessionStatus) {
        self.state.status = status;
        self.state_tx.send_replace(self.state.clone());
    }
}

// ============================================================================
// Session - Accessors
// ============================================================================

impl Session {
    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the configuration of the current attempt.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns `true` while a client is mounted.
    #[inline]
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Returns what the presentation layer should render.
    #[must_use]
    pub fn view(&self) -> View {
        match &self.state.status {
            SessionStatus::Failed(failure) => View::Failure {
                reason: failure.to_string(),
                can_switch_protocol: self.allow_protocol_switch,
            },
            status => View::Surface {
                url: self.config.url().to_string(),
                loading: *status == SessionStatus::Connecting,
            },
        }
    }
}

/// Receives from `events`, or never resolves when there is no client.
async fn recv_event(events: Option<&mut EventStream>) -> Option<ClientEvent> {
    match events {
        Some(events) => events.recv().await,
        None => future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
