//! Builtin DNS-over-HTTPS provider catalog.
//!
//! Every entry carries bootstrap addresses, so DoH traffic can be started
//! even when the platform resolver is blocked.

use super::config::ProviderConfig;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub const CLOUDFLARE: &str = "cloudflare";
pub const GOOGLE: &str = "google";
pub const QUAD9: &str = "quad9";
pub const ADGUARD: &str = "adguard";
pub const ALIDNS: &str = "alidns";
pub const DNSPOD: &str = "dnspod";

fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

#[allow(clippy::too_many_arguments)]
fn v6(a: u16, b: u16, c: u16, d: u16, e: u16, f: u16, g: u16, h: u16) -> IpAddr {
    IpAddr::V6(Ipv6Addr::new(a, b, c, d, e, f, g, h))
}

/// The fixed provider list, in default cascade order.
pub fn builtin_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(CLOUDFLARE, "Cloudflare", "https://cloudflare-dns.com/dns-query")
            .with_bootstrap([
                v4(1, 1, 1, 1),
                v4(1, 0, 0, 1),
                v6(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111),
            ]),
        ProviderConfig::new(GOOGLE, "Google", "https://dns.google/dns-query").with_bootstrap([
            v4(8, 8, 8, 8),
            v4(8, 8, 4, 4),
            v6(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888),
        ]),
        ProviderConfig::new(QUAD9, "Quad9", "https://dns.quad9.net/dns-query")
            .with_bootstrap([v4(9, 9, 9, 9), v4(149, 112, 112, 112)]),
        ProviderConfig::new(ADGUARD, "AdGuard", "https://dns.adguard-dns.com/dns-query")
            .with_bootstrap([v4(94, 140, 14, 14), v4(94, 140, 15, 15)]),
        ProviderConfig::new(ALIDNS, "AliDNS", "https://dns.alidns.com/dns-query")
            .with_bootstrap([v4(223, 5, 5, 5), v4(223, 6, 6, 6)]),
        ProviderConfig::new(DNSPOD, "DNSPod", "https://doh.pub/dns-query")
            .with_bootstrap([v4(1, 12, 12, 12), v4(120, 53, 53, 53)]),
    ]
}

/// Looks up a builtin provider by id.
pub fn builtin_provider(id: &str) -> Option<ProviderConfig> {
    builtin_providers().into_iter().find(|p| p.id == id)
}
