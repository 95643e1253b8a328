//! Page environment passed into the resolver.
//!
//! The hosting page's location and query string are captured once as an
//! [`Environment`] value so resolution never reads ambient state.
//!
//! # Example
//!
//! ```
//! use rfb_frontend::Environment;
//!
//! # fn example() -> rfb_frontend::Result<()> {
//! let env = Environment::from_page_url("https://desk.example.com/vnc/?port=6080&viewOnly=true")?;
//! assert!(env.location.is_secure());
//! assert_eq!(env.params.get("port"), Some("6080"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use url::{Url, form_urlencoded};

use crate::error::Result;

// ============================================================================
// PageLocation
// ============================================================================

/// Location of the page hosting the viewer.
///
/// Field formats mirror the browser's `Location` object: `protocol` keeps
/// its trailing colon and `port` is empty when the scheme default is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    /// Page scheme including the trailing colon (e.g. `"https:"`).
    pub protocol: String,

    /// Page hostname without port.
    pub hostname: String,

    /// Page port, empty for the scheme default.
    pub port: String,
}

impl PageLocation {
    /// Creates a location from its parts.
    #[must_use]
    pub fn new(
        protocol: impl Into<String>,
        hostname: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            port: port.into(),
        }
    }

    /// Builds a location from a parsed page URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self {
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or_default().to_string(),
            port: url.port().map(|p| p.to_string()).unwrap_or_default(),
        }
    }

    /// Returns `true` if the page itself was served over TLS.
    #[inline]
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.protocol.trim_end_matches(':').eq_ignore_ascii_case("https")
    }
}

// ============================================================================
// QueryParams
// ============================================================================

/// Decoded query-string parameters.
///
/// Lookups return the first occurrence of a key, like
/// `URLSearchParams.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: FxHashMap<String, String>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query string, with or without the leading `?`.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Returns the value of `key`, if present.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns `true` if `key` is present (even with an empty value).
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` unless it is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Adds a parameter, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the number of distinct keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameters are set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Everything the resolver is allowed to look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Location of the hosting page.
    pub location: PageLocation,

    /// Query-string parameters of the hosting page.
    pub params: QueryParams,
}

impl Environment {
    /// Creates an environment from explicit parts.
    #[inline]
    #[must_use]
    pub fn new(location: PageLocation, params: QueryParams) -> Self {
        Self { location, params }
    }

    /// Captures the environment from the full page URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`](crate::Error::Url) if `page_url` is not an absolute URL.
    pub fn from_page_url(page_url: &str) -> Result<Self> {
        let url = Url::parse(page_url)?;
        let params = url.query().map(QueryParams::parse).unwrap_or_default();

        Ok(Self {
            location: PageLocation::from_url(&url),
            params,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url_default_port() {
        let url = Url::parse("https://desk.example.com/viewer/").expect("valid url");
        let location = PageLocation::from_url(&url);

        assert_eq!(location.protocol, "https:");
        assert_eq!(location.hostname, "desk.example.com");
        assert_eq!(location.port, "");
        assert!(location.is_secure());
    }

    #[test]
    fn test_location_from_url_explicit_port() {
        let url = Url::parse("http://10.0.0.5:8080/").expect("valid url");
        let location = PageLocation::from_url(&url);

        assert_eq!(location.port, "8080");
        assert!(!location.is_secure());
    }

    #[test]
    fn test_is_secure_accepts_bare_scheme() {
        assert!(PageLocation::new("https", "h", "").is_secure());
        assert!(!PageLocation::new("file:", "", "").is_secure());
    }

    #[test]
    fn test_query_params_decoding() {
        let params = QueryParams::parse("?password=p%40ss+word&path=a%2Fb&empty=");

        assert_eq!(params.get("password"), Some("p@ss word"));
        assert_eq!(params.get("path"), Some("a/b"));
        assert_eq!(params.get("empty"), Some(""));
        assert!(params.contains("empty"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_query_params_first_occurrence_wins() {
        let params = QueryParams::parse("protocol=text&protocol=binary");
        assert_eq!(params.get("protocol"), Some("text"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_environment_from_page_url() {
        let env = Environment::from_page_url("http://localhost:5173/?hostname=vnc.lan&port=6080")
            .expect("valid page url");

        assert_eq!(env.location.hostname, "localhost");
        assert_eq!(env.location.port, "5173");
        assert_eq!(env.params.get("hostname"), Some("vnc.lan"));
    }

    #[test]
    fn test_environment_without_query() {
        let env = Environment::from_page_url("https://example.com").expect("valid page url");
        assert!(env.params.is_empty());
    }

    #[test]
    fn test_environment_rejects_relative_url() {
        assert!(Environment::from_page_url("/vnc?port=1").is_err());
    }
}
