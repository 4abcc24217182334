//! Cascade engine overhead benchmark.
//!
//! Uses in-memory resolvers so only the engine's ordering, timing and
//! metrics work is measured, not network I/O.

use criterion::{criterion_group, criterion_main, Criterion};
use dnscascade::base::ResolveError;
use dnscascade::dns::{CascadeEngine, FnResolver, Name, ResolverEntry};
use dnscascade::metrics::InMemoryMetricsCollector;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

fn failing(name: &str) -> ResolverEntry {
    ResolverEntry::new(
        name,
        Arc::new(FnResolver::new(|_name: Name| async {
            Err(ResolveError::TimedOut)
        })),
    )
}

fn answering(name: &str) -> ResolverEntry {
    ResolverEntry::new(
        name,
        Arc::new(FnResolver::new(|_name: Name| async {
            Ok(vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))])
        })),
    )
}

fn bench_cascade(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let first_wins = vec![answering("A"), answering("B")];
    let third_wins = vec![failing("A"), failing("B"), answering("C")];
    let all_fail = vec![failing("A"), failing("B"), failing("C")];

    let engine = CascadeEngine::new();
    c.bench_function("cascade_first_wins", |b| {
        b.to_async(&rt)
            .iter(|| async { engine.resolve("example.com", &first_wins).await })
    });
    c.bench_function("cascade_third_wins", |b| {
        b.to_async(&rt)
            .iter(|| async { engine.resolve("example.com", &third_wins).await })
    });
    c.bench_function("cascade_all_fail", |b| {
        b.to_async(&rt)
            .iter(|| async { engine.resolve("example.com", &all_fail).await })
    });

    let instrumented = CascadeEngine::with_collector(Arc::new(InMemoryMetricsCollector::new()));
    c.bench_function("cascade_third_wins_in_memory_metrics", |b| {
        b.to_async(&rt)
            .iter(|| async { instrumented.resolve("example.com", &third_wins).await })
    });
}

criterion_group!(benches, bench_cascade);
criterion_main!(benches);
