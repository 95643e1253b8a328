//! Lifecycle events emitted by the embedded client.
//!
//! Events arrive in the shape the browser widget dispatches them: an event
//! type plus a free-form `detail` object. [`ClientEvent::parse`] turns them
//! into [`ParsedEvent`] for the session controller.
//!
//! # Event Types
//!
//! | Type | Detail fields |
//! |------|---------------|
//! | `connect` | none |
//! | `disconnect` | `clean` |
//! | `credentialsrequired` | `types` |
//! | `securityfailure` | `status`, `reason` |
//! | `desktopname` | `name` |
//! | `clipboard` | `text` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

// ============================================================================
// Event Names
// ============================================================================

/// `connect` event type.
pub const CONNECT: &str = "connect";
/// `disconnect` event type.
pub const DISCONNECT: &str = "disconnect";
/// `credentialsrequired` event type.
pub const CREDENTIALS_REQUIRED: &str = "credentialsrequired";
/// `securityfailure` event type.
pub const SECURITY_FAILURE: &str = "securityfailure";
/// `desktopname` event type.
pub const DESKTOP_NAME: &str = "desktopname";
/// `clipboard` event type.
pub const CLIPBOARD: &str = "clipboard";

// ============================================================================
// ClientEvent
// ============================================================================

/// An event notification from the embedded client.
///
/// # Format
///
/// ```json
/// {
///   "type": "securityfailure",
///   "detail": { "status": 1, "reason": "Authentication failed" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEvent {
    /// Event type name.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event-specific data. `null` when the client sent none.
    #[serde(default)]
    pub detail: Value,
}

impl ClientEvent {
    /// Creates an event from a type and detail object.
    #[inline]
    #[must_use]
    pub fn new(event_type: impl Into<String>, detail: Value) -> Self {
        Self {
            event_type: event_type.into(),
            detail,
        }
    }

    /// Creates a `connect` event.
    #[inline]
    #[must_use]
    pub fn connect() -> Self {
        Self::new(CONNECT, Value::Null)
    }

    /// Creates a `disconnect` event.
    #[inline]
    #[must_use]
    pub fn disconnect(clean: bool) -> Self {
        Self::new(DISCONNECT, json!({ "clean": clean }))
    }

    /// Creates a `credentialsrequired` event.
    #[inline]
    #[must_use]
    pub fn credentials_required(types: &[&str]) -> Self {
        Self::new(CREDENTIALS_REQUIRED, json!({ "types": types }))
    }

    /// Creates a `securityfailure` event.
    #[inline]
    #[must_use]
    pub fn security_failure(status: Option<i64>, reason: Option<&str>) -> Self {
        Self::new(
            SECURITY_FAILURE,
            json!({ "status": status, "reason": reason }),
        )
    }

    /// Creates a `desktopname` event.
    #[inline]
    #[must_use]
    pub fn desktop_name(name: &str) -> Self {
        Self::new(DESKTOP_NAME, json!({ "name": name }))
    }

    /// Creates a `clipboard` event.
    #[inline]
    #[must_use]
    pub fn clipboard(text: &str) -> Self {
        Self::new(CLIPBOARD, json!({ "text": text }))
    }

    /// Decodes an event from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if `text` is not an event object.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.event_type.as_str() {
            CONNECT => ParsedEvent::Connected,

            DISCONNECT => ParsedEvent::Disconnected {
                clean: self.detail.get("clean").and_then(Value::as_bool),
            },

            CREDENTIALS_REQUIRED => ParsedEvent::CredentialsRequired {
                types: self
                    .detail
                    .get("types")
                    .and_then(Value::as_array)
                    .map(|types| {
                        types
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            },

            SECURITY_FAILURE => ParsedEvent::SecurityFailure {
                status: self.get_scalar_text("status"),
                reason: self.get_scalar_text("reason"),
            },

            DESKTOP_NAME => ParsedEvent::DesktopName {
                name: self.get_optional_string("name"),
            },

            CLIPBOARD => ParsedEvent::Clipboard {
                text: self.get_optional_string("text"),
            },

            _ => ParsedEvent::Unknown {
                event_type: self.event_type.clone(),
                detail: self.detail.clone(),
            },
        }
    }

    /// Gets an optional string from detail.
    #[inline]
    fn get_optional_string(&self, key: &str) -> Option<String> {
        self.detail
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Gets the textual form of a scalar from detail, whatever its JSON type.
    ///
    /// Integral numbers print without a fraction (`4.0` as `4`). `null` and
    /// missing keys give `None`.
    fn get_scalar_text(&self, key: &str) -> Option<String> {
        match self.detail.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => i.to_string(),
                (None, Some(u), _) => u.to_string(),
                (None, None, Some(f)) => f.to_string(),
                (None, None, None) => n.to_string(),
            }),
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// The client finished the handshake and is rendering.
    Connected,

    /// The tunnel closed.
    Disconnected {
        /// Whether the close was clean, if reported.
        clean: Option<bool>,
    },

    /// The server asked for credentials.
    CredentialsRequired {
        /// Requested credential kinds (e.g. `password`, `username`).
        types: Vec<String>,
    },

    /// The security handshake failed.
    SecurityFailure {
        /// Security result as reported, usually a number.
        status: Option<String>,
        /// Server-provided reason, if reported.
        reason: Option<String>,
    },

    /// The remote desktop name changed.
    DesktopName {
        /// New name, if reported.
        name: Option<String>,
    },

    /// The remote clipboard changed.
    Clipboard {
        /// New clipboard text, if reported.
        text: Option<String>,
    },

    /// Unknown event type.
    Unknown {
        /// Event type name.
        event_type: String,
        /// Event detail.
        detail: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_failure_parsing() {
        let json_str = r#"{
            "type": "securityfailure",
            "detail": { "status": 4, "reason": "password rejected" }
        }"#;

        let event = ClientEvent::from_json(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::SecurityFailure { status, reason } => {
                assert_eq!(status.as_deref(), Some("4"));
                assert_eq!(reason.as_deref(), Some("password rejected"));
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_security_failure_missing_detail() {
        let event =
            ClientEvent::from_json(r#"{ "type": "securityfailure" }"#).expect("parse event");
        assert_eq!(event.detail, Value::Null);
        assert_eq!(
            event.parse(),
            ParsedEvent::SecurityFailure {
                status: None,
                reason: None
            }
        );
    }

    #[test]
    fn test_from_json_rejects_missing_type() {
        let err = ClientEvent::from_json(r#"{ "detail": {} }"#).unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[test]
    fn test_security_failure_status_keeps_non_integer_values() {
        let status_of = |detail: Value| match ClientEvent::new(SECURITY_FAILURE, detail).parse() {
            ParsedEvent::SecurityFailure { status, .. } => status,
            other => panic!("unexpected parsed event: {other:?}"),
        };

        assert_eq!(status_of(json!({ "status": 4.0 })).as_deref(), Some("4"));
        assert_eq!(status_of(json!({ "status": 2.5 })).as_deref(), Some("2.5"));
        assert_eq!(status_of(json!({ "status": "4" })).as_deref(), Some("4"));
        assert_eq!(status_of(json!({ "status": true })).as_deref(), Some("true"));
        assert_eq!(status_of(json!({ "status": null })), None);
    }

    #[test]
    fn test_security_failure_numeric_reason() {
        let event = ClientEvent::new(SECURITY_FAILURE, json!({ "status": 1, "reason": 7 }));
        assert_eq!(
            event.parse(),
            ParsedEvent::SecurityFailure {
                status: Some("1".into()),
                reason: Some("7".into())
            }
        );
    }

    #[test]
    fn test_credentials_required_types() {
        let event = ClientEvent::credentials_required(&["username", "password"]);
        match event.parse() {
            ParsedEvent::CredentialsRequired { types } => {
                assert_eq!(types, vec!["username".to_string(), "password".to_string()]);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_desktop_name_and_clipboard() {
        assert_eq!(
            ClientEvent::desktop_name("build-box:1").parse(),
            ParsedEvent::DesktopName {
                name: Some("build-box:1".into())
            }
        );
        assert_eq!(
            ClientEvent::clipboard("copied").parse(),
            ParsedEvent::Clipboard {
                text: Some("copied".into())
            }
        );
    }

    #[test]
    fn test_connect_and_disconnect() {
        assert_eq!(ClientEvent::connect().parse(), ParsedEvent::Connected);
        assert_eq!(
            ClientEvent::disconnect(false).parse(),
            ParsedEvent::Disconnected { clean: Some(false) }
        );
    }

    #[test]
    fn test_unknown_event() {
        let event = ClientEvent::new("bell", json!({}));
        match event.parse() {
            ParsedEvent::Unknown { event_type, .. } => assert_eq!(event_type, "bell"),
            other => panic!("expected Unknown variant, got {other:?}"),
        }
    }
}
