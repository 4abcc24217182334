//! DNS-over-HTTPS resolver using hickory-dns.
//!
//! One `DohResolver` is built per provider. It talks only to the provider's
//! bootstrap addresses over HTTPS, keeps no answer cache, and owns the
//! per-query timeout.

use super::config::{DohEndpoint, ProviderConfig};
use super::{Addrs, Name, Resolve, Resolving};
use crate::base::dnserror::{ConfigError, ResolveError};
use hickory_resolver::{
    config::{LookupIpStrategy, NameServerConfig, NameServerConfigGroup, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::{xfer::Protocol, ProtoErrorKind},
    ResolveErrorKind, TokioResolver,
};
use std::{fmt, sync::Arc};

/// Async DoH resolver for a single provider.
///
/// Cheap to clone; clones share the underlying hickory resolver and its
/// HTTPS connections.
#[derive(Clone)]
pub struct DohResolver {
    provider: Arc<str>,
    resolver: Arc<TokioResolver>,
}

impl DohResolver {
    /// Creates a resolver for `provider`.
    ///
    /// Fails if the provider settings are invalid or the provider has no
    /// reachable bootstrap address.
    pub fn new(provider: &ProviderConfig) -> Result<Self, ConfigError> {
        provider.validate()?;
        let endpoint = provider.endpoint()?;
        let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers(&endpoint));

        let mut builder =
            TokioResolver::builder_with_config(resolver_config, TokioConnectionProvider::default());
        let opts = builder.options_mut();
        opts.cache_size = 0;
        opts.timeout = provider.timeout();
        opts.attempts = provider.attempts;
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        tracing::debug!(
            provider = %provider.id,
            host = %endpoint.host,
            servers = endpoint.servers.len(),
            "built DoH resolver"
        );

        Ok(Self {
            provider: provider.id.as_str().into(),
            resolver: Arc::new(builder.build()),
        })
    }

    /// Provider id this resolver talks to.
    pub fn provider(&self) -> &str {
        &self.provider
    }
}

fn name_servers(endpoint: &DohEndpoint) -> NameServerConfigGroup {
    let configs: Vec<NameServerConfig> = endpoint
        .servers
        .iter()
        .map(|socket_addr| NameServerConfig {
            socket_addr: *socket_addr,
            protocol: Protocol::Https,
            tls_dns_name: Some(endpoint.host.clone()),
            http_endpoint: Some(endpoint.path.clone()),
            trust_negative_responses: false,
            bind_addr: None,
        })
        .collect();
    NameServerConfigGroup::from(configs)
}

fn classify(domain: &str, err: &hickory_resolver::ResolveError) -> ResolveError {
    if err.is_no_records_found() {
        return ResolveError::no_addresses(domain);
    }
    if let ResolveErrorKind::Proto(proto) = err.kind() {
        match proto.kind() {
            ProtoErrorKind::Timeout => return ResolveError::TimedOut,
            ProtoErrorKind::Io(e) => return ResolveError::ConnectionFailed(e.to_string()),
            _ => {}
        }
    }
    ResolveError::lookup(domain, err.to_string())
}

impl Resolve for DohResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let this = self.clone();
        Box::pin(async move {
            let domain = name.as_str();
            tracing::debug!(provider = %this.provider, domain = %domain, "resolving via DoH");

            let lookup = this.resolver.lookup_ip(domain).await.map_err(|e| {
                tracing::debug!(
                    provider = %this.provider,
                    domain = %domain,
                    error = %e,
                    "DoH lookup failed"
                );
                classify(domain, &e)
            })?;

            let addrs: Addrs = lookup.iter().collect();

            tracing::debug!(
                provider = %this.provider,
                domain = %domain,
                count = addrs.len(),
                "DoH resolution complete"
            );
            Ok(addrs)
        })
    }
}

impl fmt::Debug for DohResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DohResolver")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}
