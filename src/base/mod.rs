//! Base types and error handling.
//!
//! - [`dnserror`]: per-attempt, aggregated and configuration errors
//! - [`context`]: `io::Result` extension for attaching DNS context

pub mod context;
pub mod dnserror;

pub use dnserror::{AllResolversFailed, AttemptFailure, ConfigError, DnsError, ResolveError};

#[cfg(test)]
mod tests;
