//! Environment to [`ConnectionConfig`] resolution.
//!
//! Pure functions: no I/O, no panics, no errors. A missing endpoint is
//! reported as an empty URL for the session controller to check.
//!
//! # Parameters
//!
//! | Parameter | Effect |
//! |-----------|--------|
//! | `url` | Endpoint used verbatim, overrides the three below |
//! | `hostname` / `port` / `path` | Endpoint fragments (defaults: page host, page port, `websockify`) |
//! | `username` / `password` | Credentials, passed through untouched |
//! | `protocol` | `text` or `binary`, anything else becomes `binary` |
//! | display options | See [`resolve_display_options`] |

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, warn};

use super::connection::{ConnectionConfig, Credentials, SubProtocol};
use super::environment::{Environment, PageLocation, QueryParams};
use super::options::DisplayOptions;

// ============================================================================
// Constants
// ============================================================================

/// Path used when the `path` parameter is absent.
pub const DEFAULT_PATH: &str = "websockify";

// ============================================================================
// Resolution
// ============================================================================

/// Resolves the complete connection descriptor.
#[must_use]
pub fn resolve(env: &Environment) -> ConnectionConfig {
    let config = ConnectionConfig::new(
        resolve_url(&env.params, &env.location),
        resolve_credentials(&env.params),
        resolve_display_options(&env.params),
        resolve_sub_protocol(&env.params),
    );

    debug!(
        url = %config.url(),
        sub_protocol = %config.sub_protocol(),
        has_username = config.credentials().username.is_some(),
        has_password = config.credentials().password.is_some(),
        "Connection config resolved"
    );

    config
}

/// Resolves the WebSocket endpoint.
///
/// An explicit `url` parameter wins, even when empty. Otherwise the URL is
/// `ws[s]://host[:port]/path`, with `wss` only when the page itself is
/// served over `https`.
#[must_use]
pub fn resolve_url(params: &QueryParams, location: &PageLocation) -> String {
    if let Some(url) = params.get("url") {
        return url.to_string();
    }

    let scheme = if location.is_secure() { "wss" } else { "ws" };
    let host = params.get("hostname").unwrap_or(location.hostname.as_str());
    let port = params.get("port").unwrap_or(location.port.as_str());
    let path = params.get("path").unwrap_or(DEFAULT_PATH);

    let mut url = format!("{scheme}://{host}");
    if !port.is_empty() {
        url.push(':');
        url.push_str(port);
    }
    url.push('/');
    url.push_str(path);
    url
}

/// Resolves credentials without validating or defaulting them.
#[must_use]
pub fn resolve_credentials(params: &QueryParams) -> Credentials {
    Credentials::new(
        params.get("username").map(str::to_string),
        params.get("password").map(str::to_string),
    )
}

/// Resolves the sub-protocol, coercing unknown values to `binary`.
#[must_use]
pub fn resolve_sub_protocol(params: &QueryParams) -> SubProtocol {
    match params.get("protocol") {
        None => SubProtocol::default(),
        Some(value) => SubProtocol::parse(value).unwrap_or_else(|| {
            warn!(protocol = %value, "Invalid protocol, falling back to binary");
            SubProtocol::Binary
        }),
    }
}

/// Resolves the optional display settings.
///
/// Integers are parsed only when present and non-empty, otherwise they
/// stay `None` so the client's defaults apply. Booleans are always set:
/// `true` only for the literal string `"true"`, `false` for anything else
/// including absence.
#[must_use]
pub fn resolve_display_options(params: &QueryParams) -> DisplayOptions {
    let int = |key: &str| parse_int(params, key);
    let flag = |key: &str| Some(params.get(key) == Some("true"));

    DisplayOptions {
        quality_level: int("qualityLevel"),
        compression_level: int("compressionLevel"),
        retry_duration: int("retryDuration"),
        view_only: flag("viewOnly"),
        focus_on_click: flag("focusOnClick"),
        resize_session: flag("resizeSession"),
        show_dot_cursor: flag("showDotCursor"),
        background: params.get("background").map(str::to_string),
        dynamic_quality_min: int("dynamicQualityMin"),
        dynamic_quality_max: int("dynamicQualityMax"),
        jpeg_video_quality: int("jpegVideoQuality"),
        webp_video_quality: int("webpVideoQuality"),
        max_video_resolution_x: int("maxVideoResolutionX"),
        max_video_resolution_y: int("maxVideoResolutionY"),
        frame_rate: int("frameRate"),
        idle_disconnect: int("idleDisconnect"),
        pointer_relative: flag("pointerRelative"),
        video_quality: int("videoQuality"),
        anti_aliasing: int("antiAliasing"),
    }
}

/// Parses an integer parameter; empty or malformed values stay unset.
fn parse_int(params: &QueryParams, key: &str) -> Option<i64> {
    let raw = params.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(param = key, value = raw, error = %e, "Ignoring non-integer option");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn http_page() -> PageLocation {
        PageLocation::new("http:", "viewer.lan", "")
    }

    fn https_page() -> PageLocation {
        PageLocation::new("https:", "viewer.lan", "8443")
    }

    #[test]
    fn test_url_defaults_insecure_page() {
        let url = resolve_url(&QueryParams::new(), &http_page());
        assert_eq!(url, "ws://viewer.lan/websockify");
    }

    #[test]
    fn test_url_defaults_secure_page_keeps_page_port() {
        let url = resolve_url(&QueryParams::new(), &https_page());
        assert_eq!(url, "wss://viewer.lan:8443/websockify");
    }

    #[test]
    fn test_url_from_fragments() {
        let params = QueryParams::new()
            .with("hostname", "10.1.1.20")
            .with("port", "6080")
            .with("path", "vnc/ws");
        let url = resolve_url(&params, &http_page());
        assert_eq!(url, "ws://10.1.1.20:6080/vnc/ws");
    }

    #[test]
    fn test_url_empty_port_param_overrides_page_port() {
        let params = QueryParams::new().with("port", "");
        let url = resolve_url(&params, &https_page());
        assert_eq!(url, "wss://viewer.lan/websockify");
    }

    #[test]
    fn test_url_explicit_override_verbatim() {
        let params = QueryParams::new()
            .with("url", "wss://relay.example.com:443/raw?token=abc")
            .with("hostname", "ignored");
        let url = resolve_url(&params, &http_page());
        assert_eq!(url, "wss://relay.example.com:443/raw?token=abc");
    }

    #[test]
    fn test_url_explicit_empty_override() {
        let params = QueryParams::new().with("url", "");
        assert_eq!(resolve_url(&params, &https_page()), "");
    }

    #[test]
    fn test_credentials_absent_stays_absent() {
        let creds = resolve_credentials(&QueryParams::new().with("password", "secret"));
        assert_eq!(creds.username, None);
        assert_eq!(creds.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_credentials_empty_kept_as_empty() {
        let creds = resolve_credentials(&QueryParams::new().with("username", ""));
        assert_eq!(creds.username.as_deref(), Some(""));
        assert_eq!(creds.password, None);
    }

    #[test]
    fn test_sub_protocol_default_and_literals() {
        assert_eq!(resolve_sub_protocol(&QueryParams::new()), SubProtocol::Binary);
        assert_eq!(
            resolve_sub_protocol(&QueryParams::new().with("protocol", "text")),
            SubProtocol::Text
        );
        assert_eq!(
            resolve_sub_protocol(&QueryParams::new().with("protocol", "TEXT")),
            SubProtocol::Binary
        );
    }

    #[test]
    fn test_display_options_absent() {
        let options = resolve_display_options(&QueryParams::new());

        assert_eq!(options.quality_level, None);
        assert_eq!(options.retry_duration, None);
        assert_eq!(options.background, None);

        assert_eq!(options.view_only, Some(false));
        assert_eq!(options.focus_on_click, Some(false));
        assert_eq!(options.resize_session, Some(false));
        assert_eq!(options.show_dot_cursor, Some(false));
        assert_eq!(options.pointer_relative, Some(false));
    }

    #[test]
    fn test_display_options_numbers() {
        let params = QueryParams::new()
            .with("qualityLevel", "6")
            .with("compressionLevel", "")
            .with("frameRate", " 30 ")
            .with("retryDuration", "soon");
        let options = resolve_display_options(&params);

        assert_eq!(options.quality_level, Some(6));
        assert_eq!(options.compression_level, None);
        assert_eq!(options.frame_rate, Some(30));
        assert_eq!(options.retry_duration, None);
    }

    #[test]
    fn test_display_options_boolean_quirk() {
        let params = QueryParams::new()
            .with("viewOnly", "true")
            .with("focusOnClick", "false")
            .with("resizeSession", "yes")
            .with("showDotCursor", "");
        let options = resolve_display_options(&params);

        assert_eq!(options.view_only, Some(true));
        assert_eq!(options.focus_on_click, Some(false));
        assert_eq!(options.resize_session, Some(false));
        assert_eq!(options.show_dot_cursor, Some(false));
        assert_eq!(options.pointer_relative, Some(false));
    }

    #[test]
    fn test_resolve_full_environment() {
        let env = Environment::new(
            http_page(),
            QueryParams::parse("port=5901&password=pw&protocol=text&background=%23000"),
        );
        let config = resolve(&env);

        assert_eq!(config.url(), "ws://viewer.lan:5901/websockify");
        assert_eq!(config.sub_protocol(), SubProtocol::Text);
        assert_eq!(config.credentials().password.as_deref(), Some("pw"));
        assert_eq!(config.display().background.as_deref(), Some("#000"));
    }

    proptest! {
        #[test]
        fn prop_default_endpoint_follows_page_security(
            host in "[a-z][a-z0-9-]{0,15}(\\.[a-z]{2,5})?",
            secure in any::<bool>(),
        ) {
            let scheme = if secure { "https:" } else { "http:" };
            let location = PageLocation::new(scheme, host.clone(), "");
            let url = resolve_url(&QueryParams::new(), &location);

            let expected_scheme = if secure { "wss" } else { "ws" };
            prop_assert_eq!(url, format!("{expected_scheme}://{host}/websockify"));
        }

        #[test]
        fn prop_empty_port_never_emits_colon(
            host in "[a-z][a-z0-9]{0,12}",
            path in "[a-z0-9/]{0,12}",
            explicit in any::<bool>(),
        ) {
            let mut params = QueryParams::new().with("hostname", host.clone()).with("path", path.clone());
            if explicit {
                params.insert("port", "");
            }
            let url = resolve_url(&params, &PageLocation::new("http:", "page", ""));
            prop_assert_eq!(url, format!("ws://{host}/{path}"));
        }

        #[test]
        fn prop_unknown_protocol_coerces_to_binary(value in ".*") {
            prop_assume!(value != "text");
            let params = QueryParams::new().with("protocol", value);
            prop_assert_eq!(resolve_sub_protocol(&params), SubProtocol::Binary);
        }

        #[test]
        fn prop_only_literal_true_is_true(value in proptest::option::of(".*")) {
            let params = match &value {
                Some(v) => QueryParams::new().with("viewOnly", v.clone()),
                None => QueryParams::new(),
            };
            let options = resolve_display_options(&params);
            prop_assert_eq!(options.view_only, Some(value.as_deref() == Some("true")));
        }
    }
}
