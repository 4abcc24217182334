//! Read-only view of the host's network DNS configuration.
//!
//! The cascade never depends on this; it only feeds diagnostics. Every
//! implementation may return nothing.

use serde::{Deserialize, Serialize};

/// DNS settings of one network interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkDnsInfo {
    pub dns_servers: Vec<String>,
    pub network_type: String,
    pub is_vpn: bool,
    pub interface_name: Option<String>,
}

/// Source of network DNS information.
pub trait NetworkInfoProvider: Send + Sync {
    fn active_network_dns_info(&self) -> Option<NetworkDnsInfo>;

    fn all_networks_dns_info(&self) -> Vec<NetworkDnsInfo> {
        self.active_network_dns_info().into_iter().collect()
    }
}

/// Provider used when no network-state source is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNetworkInfo;

impl NetworkInfoProvider for NoNetworkInfo {
    fn active_network_dns_info(&self) -> Option<NetworkDnsInfo> {
        None
    }
}

/// Reads the system resolver configuration (`/etc/resolv.conf` on Unix,
/// registry on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetworkInfo;

impl NetworkInfoProvider for SystemNetworkInfo {
    fn active_network_dns_info(&self) -> Option<NetworkDnsInfo> {
        match hickory_resolver::system_conf::read_system_conf() {
            Ok((config, _opts)) => {
                let mut dns_servers: Vec<String> = Vec::new();
                for ns in config.name_servers() {
                    let ip = ns.socket_addr.ip().to_string();
                    if !dns_servers.contains(&ip) {
                        dns_servers.push(ip);
                    }
                }
                Some(NetworkDnsInfo {
                    dns_servers,
                    network_type: "system".to_string(),
                    is_vpn: false,
                    interface_name: None,
                })
            }
            Err(e) => {
                tracing::debug!(error = %e, "system DNS configuration unavailable");
                None
            }
        }
    }
}
