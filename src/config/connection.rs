//! Resolved connection descriptor.
//!
//! A [`ConnectionConfig`] is built once per session attempt and never
//! changed afterwards. Switching the sub-protocol produces a new value.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::options::DisplayOptions;

// ============================================================================
// SubProtocol
// ============================================================================

/// WebSocket sub-protocol advertised on the tunnel handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubProtocol {
    /// Tunneled bytes carried base64-encoded in text frames.
    Text,

    /// Tunneled bytes carried verbatim in binary frames.
    #[default]
    Binary,
}

impl SubProtocol {
    /// Returns the handshake token.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }

    /// Parses one of the two literal tokens. Anything else is `None`.
    #[inline]
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }

    /// Returns the other sub-protocol.
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Text => Self::Binary,
            Self::Binary => Self::Text,
        }
    }
}

impl fmt::Display for SubProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Authentication material taken from the environment.
///
/// `None` means "not supplied". An empty string is kept as given.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Username for named-user authentication.
    pub username: Option<String>,

    /// Password or VNC secret.
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials from optional parts.
    #[inline]
    #[must_use]
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    /// Returns the password if one is usable (present and non-empty).
    #[inline]
    #[must_use]
    pub fn usable_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Returns the username if one is usable (present and non-empty).
    #[inline]
    #[must_use]
    pub fn usable_username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// ConnectionConfig
// ============================================================================

/// Immutable descriptor of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    url: String,
    credentials: Credentials,
    display: DisplayOptions,
    sub_protocol: SubProtocol,
}

impl ConnectionConfig {
    /// Creates a configuration from resolved parts.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        credentials: Credentials,
        display: DisplayOptions,
        sub_protocol: SubProtocol,
    ) -> Self {
        Self {
            url: url.into(),
            credentials,
            display,
            sub_protocol,
        }
    }

    /// Returns the WebSocket endpoint. Empty means no URL could be derived.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` if there is no endpoint to connect to.
    #[inline]
    #[must_use]
    pub fn is_missing_url(&self) -> bool {
        self.url.is_empty()
    }

    /// Returns the configured credentials.
    #[inline]
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the display options forwarded to the client.
    #[inline]
    #[must_use]
    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    /// Returns the advertised sub-protocol.
    #[inline]
    #[must_use]
    pub fn sub_protocol(&self) -> SubProtocol {
        self.sub_protocol
    }

    /// Returns a copy of this configuration with a different sub-protocol.
    #[must_use]
    pub fn with_sub_protocol(&self, sub_protocol: SubProtocol) -> Self {
        Self {
            sub_protocol,
            ..self.clone()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
