//! DNS Resolution Module
//!
//! Provides cascading hostname resolution over pluggable resolvers:
//! - System resolver (getaddrinfo via thread pool)
//! - DNS-over-HTTPS resolvers, one per provider (hickory-dns)
//! - An ordered-fallback engine trying them one after another
//! - A registry building the default or a custom ordering
//!
//! # Architecture
//!
//! The `Resolve` trait is the core abstraction: the engine and registry do
//! not care whether a resolver is syscall-backed or HTTP-based. A cascade
//! is itself a `Resolve`, so cascades nest.
//!
//! # Example
//!
//! ```rust,ignore
//! use dnscascade::dns::{ManagerConfig, ResolverManager};
//! use dnscascade::metrics::InMemoryMetricsCollector;
//! use std::sync::Arc;
//!
//! let collector = Arc::new(InMemoryMetricsCollector::new());
//! let manager = ResolverManager::new(ManagerConfig::default())?
//!     .with_collector(collector.clone());
//! let addrs = manager.resolve("example.com").await?;
//! for addr in addrs {
//!     println!("Resolved: {}", addr);
//! }
//! ```

mod cascade;
mod config;
mod doh;
mod gai;
mod manager;
mod netinfo;
pub mod provider;
mod resolve;

pub use cascade::{CascadeEngine, CascadeResolver};
pub use config::{DohEndpoint, ManagerConfig, NativePlacement, ProviderConfig};
pub use doh::DohResolver;
pub use gai::GaiResolver;
pub use manager::{
    DohResolverFactory, ProviderResolverFactory, ResolverManager, NATIVE_RESOLVER_NAME,
};
pub use netinfo::{NetworkDnsInfo, NetworkInfoProvider, NoNetworkInfo, SystemNetworkInfo};
pub use resolve::{Addrs, FnResolver, Name, Resolve, ResolverEntry, Resolving};
