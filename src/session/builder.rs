//! Builder pattern for mounting a [`Session`].
//!
//! # Example
//!
//! ```ignore
//! use rfb_frontend::{MemoryHost, Session};
//!
//! let session = Session::builder()
//!     .page_url("https://viewer.example.com/?port=6080&password=secret")
//!     .connector(my_connector)
//!     .host(MemoryHost::new())
//!     .allow_protocol_switch(true)
//!     .mount()
//!     .await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::config::{self, ConnectionConfig, Environment};
use crate::error::{Error, Result};

use super::client::ClientConnector;
use super::controller::{DisconnectPolicy, Session};
use super::host::{MemoryHost, PageHost};

// ============================================================================
// ConfigSource
// ============================================================================

/// Where the session's configuration comes from.
#[derive(Debug, Clone)]
enum ConfigSource {
    /// Full page URL, parsed at mount time.
    PageUrl(String),
    /// Captured environment, resolved at mount time.
    Environment(Environment),
    /// Already resolved configuration.
    Resolved(ConnectionConfig),
}

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for mounting a [`Session`].
///
/// Use [`Session::builder()`] to create a new builder.
#[derive(Default)]
pub struct SessionBuilder {
    /// Configuration source.
    source: Option<ConfigSource>,
    /// Embedded client factory.
    connector: Option<Arc<dyn ClientConnector>>,
    /// Hosting-page side effects.
    host: Option<Box<dyn PageHost>>,
    /// Offer the protocol-switch action.
    allow_protocol_switch: bool,
    /// Reaction to `disconnect`.
    disconnect_policy: DisconnectPolicy,
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("source", &self.source)
            .field("has_connector", &self.connector.is_some())
            .field("has_host", &self.host.is_some())
            .field("allow_protocol_switch", &self.allow_protocol_switch)
            .field("disconnect_policy", &self.disconnect_policy)
            .finish()
    }
}

// ============================================================================
// SessionBuilder Implementation
// ============================================================================

impl SessionBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the configuration from the full page URL.
    ///
    /// # Arguments
    ///
    /// * `url` - Page URL including the query string
    #[inline]
    #[must_use]
    pub fn page_url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(ConfigSource::PageUrl(url.into()));
        self
    }

    /// Resolves the configuration from a captured environment.
    #[inline]
    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.source = Some(ConfigSource::Environment(env));
        self
    }

    /// Uses an already resolved configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.source = Some(ConfigSource::Resolved(config));
        self
    }

    /// Sets the embedded client factory.
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: impl ClientConnector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Sets a shared embedded client factory.
    #[inline]
    #[must_use]
    pub fn shared_connector(mut self, connector: Arc<dyn ClientConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Sets the hosting page. Defaults to a [`MemoryHost`].
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl PageHost + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    /// Offers the protocol-switch action on the failure panel.
    #[inline]
    #[must_use]
    pub fn allow_protocol_switch(mut self, allow: bool) -> Self {
        self.allow_protocol_switch = allow;
        self
    }

    /// Sets how `disconnect` events are treated.
    #[inline]
    #[must_use]
    pub fn disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.disconnect_policy = policy;
        self
    }

    /// Resolves the configuration and mounts the session.
    ///
    /// A missing URL is not an error here: the session mounts directly in
    /// the failed state.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no configuration source or connector is set
    /// - [`Error::Url`] if the page URL cannot be parsed
    pub async fn mount(self) -> Result<Session> {
        let config = self.resolve_config()?;
        let connector = self.connector.ok_or_else(|| {
            Error::config(
                "Client connector is required. Use .connector() to set it.\n\
                 Example: Session::builder().connector(MyConnector)",
            )
        })?;
        let host = self.host.unwrap_or_else(|| Box::new(MemoryHost::new()));

        Ok(Session::mount(
            config,
            connector,
            host,
            self.allow_protocol_switch,
            self.disconnect_policy,
        )
        .await)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SessionBuilder {
    /// Produces the connection configuration from the configured source.
    fn resolve_config(&self) -> Result<ConnectionConfig> {
        let source = self.source.as_ref().ok_or_else(|| {
            Error::config(
                "Configuration source is required. Use .page_url(), .environment() or .config().",
            )
        })?;

        Ok(match source {
            ConfigSource::PageUrl(url) => config::resolve(&Environment::from_page_url(url)?),
            ConfigSource::Environment(env) => config::resolve(env),
            ConfigSource::Resolved(config) => config.clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
