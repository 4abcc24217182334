//! # dnscascade
//!
//! Reliable hostname resolution for clients on networks where the
//! platform resolver is unreliable, censored, or slow.
//!
//! `dnscascade` resolves a hostname by trying an ordered list of
//! independent backends (the platform resolver and several
//! DNS-over-HTTPS providers) until one returns addresses, while recording
//! timing and outcome data for every attempt.
//!
//! ## Features
//!
//! - **Ordered fallback**: strict priority order, first non-empty answer wins
//! - **Aggregated errors**: one error per attempted resolver, in order
//! - **DoH providers**: Cloudflare, Google, Quad9, AdGuard, AliDNS, DNSPod
//! - **Metrics**: event stream, per-resolution summaries, concurrent-safe
//!   aggregation, text/JSON reports
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dnscascade::dns::{ManagerConfig, ResolverManager};
//! use dnscascade::metrics::{reporter, InMemoryMetricsCollector, MetricsCollector};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let metrics = Arc::new(InMemoryMetricsCollector::new());
//!     let manager = ResolverManager::new(ManagerConfig::default())
//!         .unwrap()
//!         .with_collector(metrics.clone());
//!
//!     let addrs = manager.resolve("example.com").await.unwrap();
//!     println!("Addresses: {:?}", addrs);
//!     println!("{}", reporter::text_report(&metrics.aggregated_stats(), 10));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types and error context helpers
//! - [`dns`] - Resolvers, provider catalog, registry, and the cascading engine
//! - [`metrics`] - Events, summaries, collectors, and reports
//!
//! ## Limitations
//!
//! There is no answer cache: every call re-runs the cascade. The engine
//! imposes no timeout; each resolver owns its own.

pub mod base;
pub mod dns;
pub mod metrics;
