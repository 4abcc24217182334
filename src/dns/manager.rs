//! Resolver registry: builds ordered cascades from configuration.
//!
//! Provider resolvers are built lazily on first use and cached per
//! provider id for the manager's lifetime. The native resolver is created
//! once up front.

use super::cascade::CascadeEngine;
use super::config::{ManagerConfig, NativePlacement, ProviderConfig};
use super::doh::DohResolver;
use super::gai::GaiResolver;
use super::netinfo::{NetworkDnsInfo, NetworkInfoProvider};
use super::{Addrs, Resolve, ResolverEntry};
use crate::base::dnserror::{ConfigError, DnsError};
use crate::metrics::MetricsCollector;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Cascade name of the platform resolver.
pub const NATIVE_RESOLVER_NAME: &str = "Native";

/// Builds the resolver for one provider.
///
/// Called at most once per provider per manager, while the cache entry is
/// locked; implementations must not call back into the same manager.
pub trait ProviderResolverFactory: Send + Sync {
    fn build(&self, provider: &ProviderConfig) -> Result<Arc<dyn Resolve>, ConfigError>;
}

/// Default factory: one [`DohResolver`] per provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct DohResolverFactory;

impl ProviderResolverFactory for DohResolverFactory {
    fn build(&self, provider: &ProviderConfig) -> Result<Arc<dyn Resolve>, ConfigError> {
        Ok(Arc::new(DohResolver::new(provider)?))
    }
}

/// Holds the configured resolvers and runs cascades over them.
///
/// # Example
///
/// ```rust,ignore
/// use dnscascade::dns::{ManagerConfig, ResolverManager};
///
/// let manager = ResolverManager::new(ManagerConfig::default())?;
/// let addrs = manager.resolve("example.com").await?;
/// ```
pub struct ResolverManager {
    config: ManagerConfig,
    factory: Arc<dyn ProviderResolverFactory>,
    native: Arc<dyn Resolve>,
    providers: DashMap<String, Arc<dyn Resolve>>,
    engine: CascadeEngine,
    network_info: Option<Arc<dyn NetworkInfoProvider>>,
}

impl ResolverManager {
    /// Creates a manager. The configuration is validated eagerly.
    pub fn new(config: ManagerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            factory: Arc::new(DohResolverFactory),
            native: Arc::new(GaiResolver::new()),
            providers: DashMap::new(),
            engine: CascadeEngine::new(),
            network_info: None,
        })
    }

    pub fn with_factory(mut self, factory: Arc<dyn ProviderResolverFactory>) -> Self {
        self.factory = factory;
        self.providers.clear();
        self
    }

    /// Replaces the platform resolver.
    pub fn with_native(mut self, native: Arc<dyn Resolve>) -> Self {
        self.native = native;
        self
    }

    pub fn with_collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.engine = CascadeEngine::with_collector(collector);
        self
    }

    pub fn with_network_info(mut self, provider: Arc<dyn NetworkInfoProvider>) -> Self {
        self.network_info = Some(provider);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn engine(&self) -> &CascadeEngine {
        &self.engine
    }

    pub fn native_resolver(&self) -> Arc<dyn Resolve> {
        Arc::clone(&self.native)
    }

    /// The resolver for provider `id`, built on first request.
    pub fn provider_resolver(&self, id: &str) -> Result<Arc<dyn Resolve>, ConfigError> {
        if let Some(resolver) = self.providers.get(id) {
            return Ok(Arc::clone(resolver.value()));
        }

        let provider = self
            .config
            .provider(id)
            .ok_or_else(|| ConfigError::UnknownProvider(id.to_string()))?;

        match self.providers.entry(id.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let resolver = self.factory.build(provider)?;
                tracing::debug!(provider = %id, "provider resolver created");
                entry.insert(Arc::clone(&resolver));
                Ok(resolver)
            }
        }
    }

    /// Number of provider resolvers built so far.
    pub fn cached_provider_count(&self) -> usize {
        self.providers.len()
    }

    /// The configured ordering.
    pub fn ordered_resolvers(&self) -> Result<Vec<ResolverEntry>, ConfigError> {
        self.ordered_resolvers_with(self.config.native)
    }

    /// The configured providers with the native resolver placed as given.
    ///
    /// A provider whose resolver cannot be built is left out of the
    /// ordering and logged; it is retried on the next call. The error is
    /// returned only when no resolver at all remains.
    pub fn ordered_resolvers_with(
        &self,
        placement: NativePlacement,
    ) -> Result<Vec<ResolverEntry>, ConfigError> {
        let mut entries = Vec::with_capacity(self.config.providers.len() + 1);
        let mut first_error = None;
        let native = || ResolverEntry::new(NATIVE_RESOLVER_NAME, self.native_resolver());

        if placement == NativePlacement::First {
            entries.push(native());
        }
        for provider in &self.config.providers {
            match self.provider_resolver(&provider.id) {
                Ok(resolver) => entries.push(ResolverEntry::new(provider.name.as_str(), resolver)),
                Err(e) => {
                    tracing::warn!(provider = %provider.id, error = %e, "skipping provider");
                    first_error.get_or_insert(e);
                }
            }
        }
        if placement == NativePlacement::Last {
            entries.push(native());
        }

        match first_error {
            Some(e) if entries.is_empty() => Err(e),
            _ => Ok(entries),
        }
    }

    /// Pairs caller-supplied names and resolvers into a cascade.
    ///
    /// Lengths must match and names must be unique.
    pub fn custom_resolvers(
        names: Vec<String>,
        resolvers: Vec<Arc<dyn Resolve>>,
    ) -> Result<Vec<ResolverEntry>, ConfigError> {
        if names.len() != resolvers.len() {
            return Err(ConfigError::LengthMismatch {
                names: names.len(),
                resolvers: resolvers.len(),
            });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateName(name.clone()));
            }
        }
        Ok(names
            .into_iter()
            .zip(resolvers)
            .map(|(name, resolver)| ResolverEntry::new(name, resolver))
            .collect())
    }

    /// Resolves `hostname` through the configured ordering.
    pub async fn resolve(&self, hostname: &str) -> Result<Addrs, DnsError> {
        let entries = self.ordered_resolvers()?;
        self.resolve_with(hostname, &entries).await
    }

    /// Resolves `hostname` through an explicit ordering.
    pub async fn resolve_with(
        &self,
        hostname: &str,
        entries: &[ResolverEntry],
    ) -> Result<Addrs, DnsError> {
        match self.engine.resolve(hostname, entries).await {
            Ok(addrs) => Ok(addrs),
            Err(err) => {
                if let Some(info) = self.network_dns_info() {
                    tracing::warn!(
                        hostname = %hostname,
                        network = %info.network_type,
                        vpn = info.is_vpn,
                        dns_servers = ?info.dns_servers,
                        "resolution failed on active network"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Active network DNS settings, if a network-state source is attached
    /// and has an answer.
    pub fn network_dns_info(&self) -> Option<NetworkDnsInfo> {
        self.network_info
            .as_ref()
            .and_then(|p| p.active_network_dns_info())
    }

    pub fn all_network_dns_info(&self) -> Vec<NetworkDnsInfo> {
        self.network_info
            .as_ref()
            .map(|p| p.all_networks_dns_info())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ResolverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverManager")
            .field("native", &self.config.native)
            .field("providers", &self.config.providers.len())
            .field("cached", &self.providers.len())
            .finish_non_exhaustive()
    }
}
