//! Session state and the presentation decision derived from it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use uuid::Uuid;

use crate::config::SubProtocol;

// ============================================================================
// Failure
// ============================================================================

/// Category of a terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No endpoint could be derived.
    Configuration,
    /// Credentials were requested but none are configured.
    Authentication,
    /// The server rejected the security handshake.
    Security,
    /// The client could not be constructed or the tunnel dropped.
    Connection,
}

/// Why a session failed. `Display` gives the literal text shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The resolved URL is empty.
    NoUrl,

    /// `credentialsrequired` arrived without a usable password.
    PasswordRequired,

    /// `securityfailure` from the client.
    Security {
        /// Security result as reported, if any.
        status: Option<String>,
        /// Server-provided reason, if reported.
        reason: Option<String>,
    },

    /// Tunnel dropped while the fail-on-disconnect policy is active.
    Disconnected,

    /// The connector could not construct a client.
    ConnectFailed {
        /// Error text from the connector.
        message: String,
    },
}

impl Failure {
    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoUrl => FailureKind::Configuration,
            Self::PasswordRequired => FailureKind::Authentication,
            Self::Security { .. } => FailureKind::Security,
            Self::Disconnected | Self::ConnectFailed { .. } => FailureKind::Connection,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUrl => f.write_str("No URL provided"),
            Self::PasswordRequired => f.write_str("Password required but not provided"),
            Self::Security { status, reason } => {
                let status = status.as_deref().unwrap_or("null");
                let reason = reason.as_deref().unwrap_or("null");
                write!(f, "Security failure (status: {status}, reason: {reason})")
            }
            Self::Disconnected => f.write_str("Disconnected (cannot reconnect)"),
            Self::ConnectFailed { message } => f.write_str(message),
        }
    }
}

// ============================================================================
// SessionStatus
// ============================================================================

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Client constructed, handshake in progress.
    Connecting,
    /// The client reported that it is rendering the remote desktop.
    Connected,
    /// Terminal. Only a remount or protocol switch leaves this state.
    Failed(Failure),
}

// ============================================================================
// SessionState
// ============================================================================

/// State of one session attempt.
///
/// A fresh value (with a fresh `id`) is created for every mount and every
/// protocol switch; an existing value only ever moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Identifies this attempt.
    pub id: Uuid,
    /// Current status.
    pub status: SessionStatus,
    /// Sub-protocol this attempt advertises.
    pub sub_protocol: SubProtocol,
}

impl SessionState {
    /// Creates a new attempt in `Connecting`.
    #[must_use]
    pub fn connecting(sub_protocol: SubProtocol) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: SessionStatus::Connecting,
            sub_protocol,
        }
    }

    /// Returns `true` while the handshake is in progress.
    #[inline]
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.status == SessionStatus::Connecting
    }

    /// Returns `true` once the client reported a connection.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == SessionStatus::Connected
    }

    /// Returns `true` if the attempt failed.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, SessionStatus::Failed(_))
    }

    /// Returns the failure, if any.
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<&Failure> {
        match &self.status {
            SessionStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns the user-facing failure text, if any.
    #[must_use]
    pub fn failure_reason(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }
}

// ============================================================================
// View
// ============================================================================

/// Heading of the failure panel.
pub const FAILURE_HEADING: &str = "Failed to connect";

/// Label of the protocol-switch affordance.
pub const SWITCH_PROTOCOL_LABEL: &str = "Switch protocol";

/// What the presentation layer should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Full-viewport client surface.
    Surface {
        /// Endpoint being displayed.
        url: String,
        /// Show the loading placeholder over the surface.
        loading: bool,
    },

    /// Failure panel.
    Failure {
        /// Literal reason text.
        reason: String,
        /// Offer the protocol-switch button.
        can_switch_protocol: bool,
    },
}

impl View {
    /// Returns the panel heading, for failure views.
    #[inline]
    #[must_use]
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Self::Surface { .. } => None,
            Self::Failure { .. } => Some(FAILURE_HEADING),
        }
    }

    /// Returns `true` for the failure panel.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
