//! Resolver ordering and DoH provider configuration.

use crate::base::context::IoResultExt;
use crate::base::dnserror::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// A DNS-over-HTTPS provider.
///
/// `url` is the DoH endpoint, e.g. `https://dns.google/dns-query`. When the
/// host is not an IP literal, `bootstrap` must list the provider's server
/// addresses so that reaching the provider never depends on the platform
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable identity, used as the cache key.
    pub id: String,
    /// Display name, used as the resolver name in a cascade.
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub bootstrap: Vec<IpAddr>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_attempts")]
    pub attempts: usize,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_attempts() -> usize {
    2
}

/// Parsed and validated DoH endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DohEndpoint {
    /// TLS server name.
    pub host: String,
    pub path: String,
    pub servers: Vec<SocketAddr>,
}

impl ProviderConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            bootstrap: Vec::new(),
            timeout_ms: default_timeout_ms(),
            attempts: default_attempts(),
        }
    }

    pub fn with_bootstrap(mut self, ips: impl IntoIterator<Item = IpAddr>) -> Self {
        self.bootstrap.extend(ips);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Rejects non-https URLs, missing hosts, hostnames without bootstrap
    /// addresses, and a zero timeout or attempt count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProvider {
            provider: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms must be greater than zero"));
        }
        if self.attempts == 0 {
            return Err(invalid("attempts must be greater than zero"));
        }
        self.endpoint().map(|_| ())
    }

    /// Validates the provider and resolves its endpoint.
    pub fn endpoint(&self) -> Result<DohEndpoint, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidProviderUrl {
            provider: self.id.clone(),
            reason: reason.to_string(),
        };

        let url = Url::parse(&self.url).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "https" {
            return Err(invalid("scheme must be https"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = url.port_or_known_default().unwrap_or(443);
        let path = match url.path() {
            "" | "/" => "/dns-query".to_string(),
            p => p.to_string(),
        };

        let mut ips = self.bootstrap.clone();
        if let Ok(ip) = host.parse::<IpAddr>() {
            if !ips.contains(&ip) {
                ips.insert(0, ip);
            }
        }
        if ips.is_empty() {
            return Err(ConfigError::MissingBootstrap(self.id.clone()));
        }

        Ok(DohEndpoint {
            host: host.to_string(),
            path,
            servers: ips.into_iter().map(|ip| SocketAddr::new(ip, port)).collect(),
        })
    }
}

/// Where the platform resolver sits in the default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativePlacement {
    /// Native resolver first, then providers in configured order.
    #[default]
    First,
    /// Providers first, native resolver as the last resort.
    Last,
    /// Providers only.
    Omit,
}

/// Configuration of a [`ResolverManager`](super::ResolverManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    #[serde(default)]
    pub native: NativePlacement,
    #[serde(default = "super::provider::builtin_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            native: NativePlacement::First,
            providers: super::provider::builtin_providers(),
        }
    }
}

impl ManagerConfig {
    /// Builtin providers without the native resolver.
    pub fn providers_only() -> Self {
        Self {
            native: NativePlacement::Omit,
            ..Default::default()
        }
    }

    /// Builtin providers with the native resolver as the last resort.
    pub fn native_last() -> Self {
        Self {
            native: NativePlacement::Last,
            ..Default::default()
        }
    }

    /// Toggle between native-first and providers-only.
    pub fn use_native_first(mut self, enabled: bool) -> Self {
        self.native = if enabled {
            NativePlacement::First
        } else {
            NativePlacement::Omit
        };
        self
    }

    pub fn with_providers(mut self, providers: Vec<ProviderConfig>) -> Self {
        self.providers = providers;
        self
    }

    pub fn provider(&self, id: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).config_context()?;
        Self::from_json_str(&json)
    }

    /// Rejects duplicate provider ids/names and invalid endpoints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, provider) in self.providers.iter().enumerate() {
            provider.validate()?;
            let dup = self.providers[..i]
                .iter()
                .any(|p| p.id == provider.id || p.name == provider.name);
            if dup {
                return Err(ConfigError::DuplicateName(provider.name.clone()));
            }
            if provider.name == super::manager::NATIVE_RESOLVER_NAME {
                return Err(ConfigError::DuplicateName(provider.name.clone()));
            }
        }
        Ok(())
    }
}
