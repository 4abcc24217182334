//! Resolver registry tests.
//!
//! Covers lazy at-most-once provider construction under concurrency,
//! instance reuse across resolutions, providers that cannot be built,
//! custom orderings, and loading the configuration from a file.

use dnscascade::base::{ConfigError, DnsError, ResolveError};
use dnscascade::dns::provider::{CLOUDFLARE, GOOGLE};
use dnscascade::dns::{
    FnResolver, ManagerConfig, Name, NativePlacement, ProviderConfig, ProviderResolverFactory,
    Resolve, ResolverManager,
};
use dnscascade::metrics::{InMemoryMetricsCollector, MetricsCollector};

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Factory counting builds; every provider answers with a fixed address.
#[derive(Default)]
struct CountingFactory {
    builds: AtomicUsize,
}

impl ProviderResolverFactory for CountingFactory {
    fn build(&self, provider: &ProviderConfig) -> Result<Arc<dyn Resolve>, ConfigError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        // Widen the race window between concurrent first requests.
        std::thread::sleep(std::time::Duration::from_millis(5));
        let octet = provider.name.len() as u8;
        Ok(Arc::new(FnResolver::new(move |_name: Name| async move {
            Ok(vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, octet))])
        })))
    }
}

/// Factory that cannot build one provider and answers for the rest.
struct PartialFactory {
    broken: &'static str,
}

impl ProviderResolverFactory for PartialFactory {
    fn build(&self, provider: &ProviderConfig) -> Result<Arc<dyn Resolve>, ConfigError> {
        if provider.id == self.broken {
            return Err(ConfigError::InvalidProviderUrl {
                provider: provider.id.clone(),
                reason: "transport unavailable".into(),
            });
        }
        Ok(Arc::new(FnResolver::new(|_name: Name| async {
            Ok(vec![IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1))])
        })))
    }
}

fn failing_native() -> Arc<dyn Resolve> {
    Arc::new(FnResolver::new(|_name: Name| async {
        Err(ResolveError::TimedOut)
    }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_builds_once() {
    let factory = Arc::new(CountingFactory::default());
    let manager = Arc::new(
        ResolverManager::new(ManagerConfig::default())
            .unwrap()
            .with_factory(factory.clone()),
    );

    let mut handles = Vec::new();
    for _ in 0..16 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            manager.provider_resolver(GOOGLE).unwrap()
        }));
    }

    let mut resolvers = Vec::new();
    for handle in handles {
        resolvers.push(handle.await.unwrap());
    }

    assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    assert!(resolvers.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(manager.cached_provider_count(), 1);
}

#[tokio::test]
async fn test_resolutions_reuse_provider_instances() {
    let factory = Arc::new(CountingFactory::default());
    let collector = Arc::new(InMemoryMetricsCollector::new());
    let manager = ResolverManager::new(ManagerConfig::default())
        .unwrap()
        .with_factory(factory.clone())
        .with_native(failing_native())
        .with_collector(collector.clone());

    for _ in 0..3 {
        let addrs = manager.resolve("reuse.test").await.unwrap();
        // "Cloudflare" is the first provider after the failing native resolver.
        assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 10))]);
    }

    // Building the ordering materializes every configured provider once.
    let configured = manager.config().providers.len();
    assert_eq!(factory.builds.load(Ordering::SeqCst), configured);
    assert_eq!(manager.cached_provider_count(), configured);

    let stats = collector.aggregated_stats();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.resolver_stats["Native"].failure_count, 3);
    assert_eq!(stats.resolver_stats["Cloudflare"].success_count, 3);
    assert!(!stats.resolver_stats.contains_key("Google"));
}

#[tokio::test]
async fn test_unbuildable_provider_still_tries_native() {
    let native: Arc<dyn Resolve> = Arc::new(FnResolver::new(|_name: Name| async {
        Ok(vec![IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))])
    }));
    let manager = ResolverManager::new(ManagerConfig::default())
        .unwrap()
        .with_factory(Arc::new(PartialFactory { broken: CLOUDFLARE }))
        .with_native(native);

    let addrs = manager.resolve("native.test").await.unwrap();
    assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))]);

    let names: Vec<_> = manager
        .ordered_resolvers()
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names.first().map(String::as_str), Some("Native"));
    assert!(!names.iter().any(|n| n == "Cloudflare"));
    assert!(names.iter().any(|n| n == "Google"));
}

#[tokio::test]
async fn test_unbuildable_provider_is_skipped_in_cascade() {
    let collector = Arc::new(InMemoryMetricsCollector::new());
    let manager = ResolverManager::new(ManagerConfig::default())
        .unwrap()
        .with_factory(Arc::new(PartialFactory { broken: CLOUDFLARE }))
        .with_native(failing_native())
        .with_collector(collector.clone());

    let addrs = manager.resolve("skip.test").await.unwrap();
    assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1))]);

    let stats = collector.aggregated_stats();
    assert_eq!(stats.resolver_stats["Native"].failure_count, 1);
    assert_eq!(stats.resolver_stats["Google"].success_count, 1);
    assert!(!stats.resolver_stats.contains_key("Cloudflare"));
}

#[tokio::test]
async fn test_no_buildable_resolver_is_config_error() {
    let config = ManagerConfig::providers_only()
        .with_providers(vec![dnscascade::dns::provider::builtin_provider(CLOUDFLARE).unwrap()]);
    let manager = ResolverManager::new(config)
        .unwrap()
        .with_factory(Arc::new(PartialFactory { broken: CLOUDFLARE }));

    let err = manager.resolve("none.test").await.unwrap_err();
    assert!(matches!(
        err,
        DnsError::Config(ConfigError::InvalidProviderUrl { ref provider, .. }) if provider == CLOUDFLARE
    ));
}

#[tokio::test]
async fn test_custom_ordering() {
    let first: Arc<dyn Resolve> = failing_native();
    let second: Arc<dyn Resolve> = Arc::new(FnResolver::new(|_name: Name| async {
        Ok(vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))])
    }));

    let entries =
        ResolverManager::custom_resolvers(vec!["First".into(), "Second".into()], vec![first, second])
            .unwrap();
    let manager = ResolverManager::new(ManagerConfig::providers_only()).unwrap();

    let addrs = manager.resolve_with("custom.test", &entries).await.unwrap();
    assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7))]);
}

#[test]
fn test_custom_ordering_length_mismatch() {
    let err = ResolverManager::custom_resolvers(
        vec!["A".into(), "B".into(), "C".into()],
        vec![failing_native(), failing_native()],
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::LengthMismatch { names: 3, resolvers: 2 }));
}

#[tokio::test]
async fn test_all_failed_surfaces_as_dns_error() {
    let manager = ResolverManager::new(ManagerConfig::default().with_providers(vec![]))
        .unwrap()
        .with_native(failing_native());

    let err = manager.resolve("down.test").await.unwrap_err();
    match &err {
        DnsError::AllResolversFailed(all) => {
            assert_eq!(all.len(), 1);
            assert_eq!(all.resolvers().collect::<Vec<_>>(), vec!["Native"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.attempt_failures().map(|f| f.len()), Some(1));
}

#[tokio::test]
async fn test_placement_override() {
    let manager = ResolverManager::new(ManagerConfig::default())
        .unwrap()
        .with_factory(Arc::new(CountingFactory::default()));

    let entries = manager.ordered_resolvers_with(NativePlacement::Last).unwrap();
    assert_eq!(entries.first().map(|e| e.name()), Some("Cloudflare"));
    assert_eq!(entries.last().map(|e| e.name()), Some("Native"));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "native": "last",
            "providers": [
                {{
                    "id": "{CLOUDFLARE}",
                    "name": "Cloudflare",
                    "url": "https://cloudflare-dns.com/dns-query",
                    "bootstrap": ["1.1.1.1", "1.0.0.1"],
                    "timeout_ms": 2000
                }}
            ]
        }}"#
    )
    .unwrap();

    let config = ManagerConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.native, NativePlacement::Last);
    assert_eq!(config.providers.len(), 1);
    assert_eq!(config.providers[0].timeout_ms, 2000);
    assert_eq!(config.providers[0].attempts, 2);

    let manager = ResolverManager::new(config).unwrap();
    let names: Vec<_> = manager
        .ordered_resolvers()
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(names, vec!["Cloudflare", "Native"]);
}

#[test]
fn test_config_file_missing() {
    let err = ManagerConfig::from_json_file("/nonexistent/dnscascade.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
