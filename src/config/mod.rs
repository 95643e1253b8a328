//! Configuration Resolver.
//!
//! Turns the hosting page's location and query string into an immutable
//! [`ConnectionConfig`]. Nothing here performs I/O or fails: malformed
//! input is coerced or dropped with a diagnostic.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Environment`] | Page location + query parameters |
//! | [`ConnectionConfig`] | Resolved endpoint, credentials, options, sub-protocol |
//! | [`DisplayOptions`] | Optional settings forwarded to the client |
//! | [`SubProtocol`] | `text` or `binary` tunnel framing |
//!
//! # Example
//!
//! ```
//! use rfb_frontend::config::{self, Environment};
//!
//! # fn example() -> rfb_frontend::Result<()> {
//! let env = Environment::from_page_url("http://viewer.lan/?port=6080")?;
//! let config = config::resolve(&env);
//! assert_eq!(config.url(), "ws://viewer.lan:6080/websockify");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Resolved connection descriptor types.
pub mod connection;

/// Page environment capture.
pub mod environment;

/// Display options forwarded to the client.
pub mod options;

/// Pure resolution functions.
pub mod resolver;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{ConnectionConfig, Credentials, SubProtocol};
pub use environment::{Environment, PageLocation, QueryParams};
pub use options::DisplayOptions;
pub use resolver::{
    DEFAULT_PATH, resolve, resolve_credentials, resolve_display_options, resolve_sub_protocol,
    resolve_url,
};
