//! Messages sent to the embedded client.
//!
//! [`ClientInit`] is the initialisation bag the client is constructed with;
//! [`CredentialsPayload`] answers a `credentialsrequired` event.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::config::{ConnectionConfig, Credentials, DisplayOptions, SubProtocol};

// ============================================================================
// Constants
// ============================================================================

/// Background used when the `background` parameter is absent.
pub const DEFAULT_BACKGROUND: &str = "rgba(0, 0, 0, 0)";

// ============================================================================
// ConnectionOptions
// ============================================================================

/// Fixed connection behaviour applied to every session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionOptions {
    /// Scale the remote desktop to the viewport.
    pub scale_viewport: bool,

    /// Clip the remote desktop to the viewport.
    pub clip_viewport: bool,

    /// Allow dragging the viewport.
    pub drag_viewport: bool,

    /// Mirror the remote clipboard.
    pub clipboard_sync: bool,

    /// Negotiate peer media when the server offers it.
    pub peer_media: bool,

    /// Verbose client diagnostics.
    pub debug: bool,

    /// Connect as soon as the client is constructed.
    pub auto_connect: bool,
}

impl ConnectionOptions {
    /// Returns the fixed option bag.
    #[must_use]
    pub fn fixed() -> Self {
        Self {
            scale_viewport: true,
            clip_viewport: true,
            drag_viewport: false,
            clipboard_sync: true,
            peer_media: true,
            debug: true,
            auto_connect: true,
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::fixed()
    }
}

// ============================================================================
// ClientInit
// ============================================================================

/// Options passed through to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfbOptions {
    /// Sub-protocols offered on the WebSocket handshake.
    pub ws_protocols: Vec<SubProtocol>,
}

/// Initialisation bag for one embedded client instance.
///
/// # Format
///
/// ```json
/// {
///   "url": "ws://host/websockify",
///   "qualityLevel": 6,
///   "scaleViewport": true,
///   "background": "rgba(0, 0, 0, 0)",
///   "rfbOptions": { "wsProtocols": ["binary"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInit {
    /// WebSocket endpoint.
    pub url: String,

    /// Display settings. Unset fields are omitted, except `background`
    /// which always carries [`DEFAULT_BACKGROUND`] at least.
    #[serde(flatten)]
    pub display: DisplayOptions,

    /// Fixed connection behaviour.
    #[serde(flatten)]
    pub options: ConnectionOptions,

    /// Protocol-layer options.
    pub rfb_options: RfbOptions,
}

impl ClientInit {
    /// Builds the initialisation bag for a resolved configuration.
    #[must_use]
    pub fn from_config(config: &ConnectionConfig) -> Self {
        let mut display = config.display().clone();
        display
            .background
            .get_or_insert_with(|| DEFAULT_BACKGROUND.to_string());

        Self {
            url: config.url().to_string(),
            display,
            options: ConnectionOptions::fixed(),
            rfb_options: RfbOptions {
                ws_protocols: vec![config.sub_protocol()],
            },
        }
    }

    /// Returns the single advertised sub-protocol.
    #[inline]
    #[must_use]
    pub fn sub_protocol(&self) -> SubProtocol {
        self.rfb_options
            .ws_protocols
            .first()
            .copied()
            .unwrap_or_default()
    }
}

// ============================================================================
// CredentialsPayload
// ============================================================================

/// Credentials supplied in answer to `credentialsrequired`.
///
/// `username` is omitted from the payload entirely when not configured so
/// the server sees anonymous-username authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsPayload {
    /// Username, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password.
    pub password: String,
}

impl CredentialsPayload {
    /// Builds the payload, or `None` if no usable password is configured.
    #[must_use]
    pub fn from_credentials(credentials: &Credentials) -> Option<Self> {
        let password = credentials.usable_password()?;
        Some(Self {
            username: credentials.usable_username().map(str::to_string),
            password: password.to_string(),
        })
    }
}

impl std::fmt::Debug for CredentialsPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsPayload")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config(display: DisplayOptions, sub_protocol: SubProtocol) -> ConnectionConfig {
        ConnectionConfig::new(
            "ws://viewer.lan/websockify",
            Credentials::default(),
            display,
            sub_protocol,
        )
    }

    #[test]
    fn test_fixed_options() {
        let options = ConnectionOptions::fixed();
        assert!(options.scale_viewport);
        assert!(options.clip_viewport);
        assert!(!options.drag_viewport);
        assert!(options.clipboard_sync);
        assert!(options.peer_media);
        assert!(options.auto_connect);
    }

    #[test]
    fn test_client_init_json_shape() {
        let init = ClientInit::from_config(&config(
            DisplayOptions::new().with_quality_level(6),
            SubProtocol::Text,
        ));
        let json = serde_json::to_value(&init).expect("serialize");

        assert_eq!(json["url"], "ws://viewer.lan/websockify");
        assert_eq!(json["qualityLevel"], 6);
        assert_eq!(json["scaleViewport"], true);
        assert_eq!(json["dragViewport"], false);
        assert_eq!(json["rfbOptions"]["wsProtocols"], serde_json::json!(["text"]));
        assert!(json.get("compressionLevel").is_none());
        assert!(json.get("viewOnly").is_none());
        assert_eq!(json["background"], DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_client_init_background_override() {
        let init = ClientInit::from_config(&config(
            DisplayOptions::new().with_background("#202020"),
            SubProtocol::Binary,
        ));

        assert_eq!(init.display.background.as_deref(), Some("#202020"));

        let json = serde_json::to_value(&init).expect("serialize");
        assert_eq!(json["background"], "#202020");
    }

    #[test]
    fn test_client_init_reads_back_its_json() {
        let display = DisplayOptions {
            view_only: Some(false),
            focus_on_click: Some(false),
            ..DisplayOptions::new()
                .with_quality_level(6)
                .with_background("#202020")
        };
        let init = ClientInit::from_config(&config(display, SubProtocol::Text));

        let json = serde_json::to_string(&init).expect("serialize");
        let decoded: ClientInit = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(decoded, init);
        assert_eq!(decoded.options, ConnectionOptions::fixed());
    }

    #[test]
    fn test_client_init_default_background_reads_back() {
        let init = ClientInit::from_config(&config(DisplayOptions::new(), SubProtocol::Binary));

        let json = serde_json::to_string(&init).expect("serialize");
        let decoded: ClientInit = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(decoded.display.background.as_deref(), Some(DEFAULT_BACKGROUND));
        assert_eq!(decoded, init);
    }

    #[test]
    fn test_client_init_sub_protocol() {
        let init = ClientInit::from_config(&config(DisplayOptions::new(), SubProtocol::Binary));
        assert_eq!(init.sub_protocol(), SubProtocol::Binary);
    }

    #[test]
    fn test_credentials_payload_omits_missing_username() {
        let creds = Credentials::new(None, Some("pw".into()));
        let payload = CredentialsPayload::from_credentials(&creds).expect("usable password");
        let json = serde_json::to_value(&payload).expect("serialize");

        assert_eq!(json, serde_json::json!({ "password": "pw" }));
    }

    #[test]
    fn test_credentials_payload_with_username() {
        let creds = Credentials::new(Some("alice".into()), Some("pw".into()));
        let payload = CredentialsPayload::from_credentials(&creds).expect("usable password");
        assert_eq!(payload.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_credentials_payload_requires_password() {
        assert!(CredentialsPayload::from_credentials(&Credentials::default()).is_none());
        let empty = Credentials::new(Some("alice".into()), Some(String::new()));
        assert!(CredentialsPayload::from_credentials(&empty).is_none());
    }
}
