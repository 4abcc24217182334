//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `ResolveError` variants.

use crate::base::dnserror::{ConfigError, ResolveError};
use std::io;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add DNS resolution context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use dnscascade::base::context::IoResultExt;
    ///
    /// let addrs = ("example.com", 0).to_socket_addrs()
    ///     .dns_context("example.com")?;
    /// // Error: "Name not resolved: example.com"
    /// ```
    fn dns_context(self, hostname: &str) -> Result<T, ResolveError>;

    /// Add config-loading context to an IO error.
    fn config_context(self) -> Result<T, ConfigError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn dns_context(self, hostname: &str) -> Result<T, ResolveError> {
        self.map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut => ResolveError::TimedOut,
            io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
                ResolveError::ConnectionFailed(e.to_string())
            }
            _ => ResolveError::name_not_resolved(hostname, e),
        })
    }

    fn config_context(self) -> Result<T, ConfigError> {
        self.map_err(ConfigError::from)
    }
}
