//! Core DNS resolution types and traits.
//!
//! This module defines the `Resolve` trait and supporting types that form
//! the foundation of the resolver capability: anything that turns a
//! hostname into a list of addresses or fails with a [`ResolveError`].

use crate::base::dnserror::ResolveError;
use std::{fmt, future::Future, net::IpAddr, pin::Pin, sync::Arc};

/// A domain name to resolve into IP addresses.
///
/// This is a lightweight wrapper around a hostname string. The hostname is
/// passed through unmodified: no normalization and no case-folding.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Resolved addresses, in the order the backend returned them.
pub type Addrs = Vec<IpAddr>;

/// Alias for the `Future` type returned by a DNS resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, ResolveError>> + Send>>;

/// Trait for DNS resolution.
///
/// Implemented by the platform resolver, the DoH provider resolvers, and
/// by whole cascades. Implementations must be thread-safe.
///
/// # Design Notes
///
/// - Uses `&self` for concurrent resolution without mutable access.
/// - Returns boxed futures for trait object compatibility.
/// - An empty `Ok` list is allowed; the cascade treats it as a miss.
/// - Any timeout belongs to the implementation, not to the caller.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// Adapter turning a closure into a [`Resolve`] implementation.
///
/// # Example
///
/// ```rust,ignore
/// use dnscascade::dns::{FnResolver, Name};
///
/// let fixed = FnResolver::new(|_name: Name| async {
///     Ok(vec!["1.1.1.1".parse().unwrap()])
/// });
/// ```
pub struct FnResolver<F> {
    func: F,
}

impl<F, Fut> FnResolver<F>
where
    F: Fn(Name) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Addrs, ResolveError>> + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Resolve for FnResolver<F>
where
    F: Fn(Name) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Addrs, ResolveError>> + Send + 'static,
{
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin((self.func)(name))
    }
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").finish_non_exhaustive()
    }
}

/// A named resolver, one element of a cascade.
///
/// The name is the entry's identity: per-resolver metrics are keyed by it,
/// so it must be unique within one cascade.
#[derive(Clone)]
pub struct ResolverEntry {
    name: Arc<str>,
    resolver: Arc<dyn Resolve>,
}

impl ResolverEntry {
    pub fn new(name: impl Into<Arc<str>>, resolver: Arc<dyn Resolve>) -> Self {
        Self {
            name: name.into(),
            resolver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolver(&self) -> &Arc<dyn Resolve> {
        &self.resolver
    }
}

impl fmt::Debug for ResolverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
