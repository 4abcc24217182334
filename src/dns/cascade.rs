//! Ordered-fallback resolution.
//!
//! Resolvers are attempted strictly in list order, one at a time. The
//! first one returning at least one address wins and later resolvers are
//! never consulted. Failures and empty answers are recorded and the loop
//! moves on; only exhausting the list is an error.
//!
//! The engine has no timeout of its own. A resolver that never completes
//! stalls its cascade.

use super::{Addrs, Name, Resolve, ResolverEntry, Resolving};
use crate::base::dnserror::{AllResolversFailed, AttemptFailure, ResolveError};
use crate::metrics::{
    AttemptOutcome, AttemptRecord, DnsEvent, MetricsCollector, NoopMetricsCollector,
    ResolutionSummary,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::time::Instant;
use time::OffsetDateTime;

/// Runs cascades and reports them to a [`MetricsCollector`].
///
/// Cheap to clone; clones share the collector.
#[derive(Clone)]
pub struct CascadeEngine {
    collector: Arc<dyn MetricsCollector>,
}

impl Default for CascadeEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl CascadeEngine {
    /// Engine without instrumentation.
    pub fn new() -> Self {
        Self {
            collector: Arc::new(NoopMetricsCollector),
        }
    }

    pub fn with_collector(collector: Arc<dyn MetricsCollector>) -> Self {
        Self { collector }
    }

    pub fn collector(&self) -> &Arc<dyn MetricsCollector> {
        &self.collector
    }

    // Collector calls must never disturb the resolution.
    fn emit(&self, event: DnsEvent) {
        let collector = &self.collector;
        if catch_unwind(AssertUnwindSafe(|| collector.record_event(&event))).is_err() {
            tracing::warn!(
                event = %event.event_type,
                hostname = %event.hostname,
                "metrics collector panicked while recording event"
            );
        }
    }

    fn emit_summary(&self, summary: &ResolutionSummary) {
        let collector = &self.collector;
        if catch_unwind(AssertUnwindSafe(|| collector.record_metrics(summary))).is_err() {
            tracing::warn!(
                hostname = %summary.hostname,
                "metrics collector panicked while recording summary"
            );
        }
    }

    /// Resolves `hostname` against `resolvers` in order.
    ///
    /// Fails with [`AllResolversFailed`] listing one error per resolver, in
    /// attempt order, when none produced an address.
    pub async fn resolve(
        &self,
        hostname: &str,
        resolvers: &[ResolverEntry],
    ) -> Result<Addrs, AllResolversFailed> {
        self.resolve_with_summary(hostname, resolvers).await.0
    }

    /// Like [`resolve`](Self::resolve), also returning the summary handed
    /// to the collector.
    pub async fn resolve_with_summary(
        &self,
        hostname: &str,
        resolvers: &[ResolverEntry],
    ) -> (Result<Addrs, AllResolversFailed>, ResolutionSummary) {
        let started_at = OffsetDateTime::now_utc();
        let start = Instant::now();
        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(resolvers.len());
        let mut failures: Vec<AttemptFailure> = Vec::new();

        self.emit(DnsEvent::resolve_start(hostname, resolvers.len()));

        let mut resolved: Option<(String, Addrs)> = None;
        for (index, entry) in resolvers.iter().enumerate() {
            let name = entry.name();
            self.emit(DnsEvent::attempt_start(hostname, name, index));
            tracing::debug!(hostname = %hostname, resolver = %name, index, "resolver attempt");

            let attempt_started_at = OffsetDateTime::now_utc();
            let attempt_start = Instant::now();
            let result = entry.resolver().resolve(Name::new(hostname)).await;
            let duration_ms = elapsed_ms(attempt_start);

            let outcome = match result {
                Ok(addrs) if !addrs.is_empty() => {
                    self.emit(DnsEvent::attempt_success(
                        hostname,
                        name,
                        index,
                        duration_ms,
                        &addrs,
                    ));
                    tracing::debug!(
                        hostname = %hostname,
                        resolver = %name,
                        count = addrs.len(),
                        duration_ms,
                        "resolver succeeded"
                    );
                    resolved = Some((name.to_string(), addrs.clone()));
                    AttemptOutcome::Success(addrs)
                }
                Ok(_) => {
                    self.emit(DnsEvent::attempt_empty(hostname, name, index, duration_ms));
                    tracing::debug!(
                        hostname = %hostname,
                        resolver = %name,
                        duration_ms,
                        "resolver returned no addresses"
                    );
                    failures.push(AttemptFailure {
                        resolver: name.to_string(),
                        error: ResolveError::no_addresses(hostname),
                    });
                    AttemptOutcome::Empty
                }
                Err(error) => {
                    let message = error.to_string();
                    self.emit(DnsEvent::attempt_failure(
                        hostname,
                        name,
                        index,
                        duration_ms,
                        &message,
                    ));
                    tracing::warn!(
                        hostname = %hostname,
                        resolver = %name,
                        error = %message,
                        duration_ms,
                        "resolver failed, trying next"
                    );
                    failures.push(AttemptFailure {
                        resolver: name.to_string(),
                        error,
                    });
                    AttemptOutcome::Failure(message)
                }
            };

            attempts.push(AttemptRecord {
                resolver_name: name.to_string(),
                started_at: attempt_started_at,
                duration_ms,
                outcome,
            });

            if resolved.is_some() {
                break;
            }
        }

        let total_ms = elapsed_ms(start);
        let result = match resolved {
            Some((resolver, addrs)) => {
                self.emit(DnsEvent::resolve_success(hostname, &resolver, total_ms, &addrs));
                Ok(addrs)
            }
            None => {
                let err = AllResolversFailed::new(hostname, failures);
                self.emit(DnsEvent::resolve_failure(
                    hostname,
                    total_ms,
                    &err.to_string(),
                    resolvers.len(),
                ));
                tracing::warn!(
                    hostname = %hostname,
                    attempts = err.len(),
                    duration_ms = total_ms,
                    "all resolvers failed"
                );
                Err(err)
            }
        };

        let error = result.as_ref().err().map(ToString::to_string);
        let summary =
            ResolutionSummary::from_attempts(hostname, started_at, total_ms, attempts, error);
        self.emit_summary(&summary);

        (result, summary)
    }
}

impl std::fmt::Debug for CascadeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeEngine").finish_non_exhaustive()
    }
}

/// A fixed cascade usable anywhere a single [`Resolve`] is expected.
#[derive(Clone, Debug)]
pub struct CascadeResolver {
    engine: CascadeEngine,
    entries: Arc<[ResolverEntry]>,
}

impl CascadeResolver {
    pub fn new(engine: CascadeEngine, entries: Vec<ResolverEntry>) -> Self {
        Self {
            engine,
            entries: entries.into(),
        }
    }

    pub fn entries(&self) -> &[ResolverEntry] {
        &self.entries
    }
}

impl Resolve for CascadeResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let this = self.clone();
        Box::pin(async move {
            this.engine
                .resolve(name.as_str(), &this.entries)
                .await
                .map_err(|e| ResolveError::lookup(name.as_str(), e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::FnResolver;
    use crate::metrics::{AggregatedStats, DnsEventType, InMemoryMetricsCollector};
    use std::net::IpAddr;
    use std::sync::Mutex;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn fixed(name: &str, result: Result<Addrs, ResolveError>) -> ResolverEntry {
        ResolverEntry::new(
            name,
            Arc::new(FnResolver::new(move |_name: Name| {
                std::future::ready(result.clone())
            })),
        )
    }

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<DnsEventType>>,
        summaries: Mutex<Vec<ResolutionSummary>>,
    }

    impl MetricsCollector for EventLog {
        fn record_event(&self, event: &DnsEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }

        fn record_metrics(&self, summary: &ResolutionSummary) {
            self.summaries.lock().unwrap().push(summary.clone());
        }

        fn aggregated_stats(&self) -> AggregatedStats {
            AggregatedStats::default()
        }

        fn clear_stats(&self) {}
    }

    struct PanickingCollector;

    impl MetricsCollector for PanickingCollector {
        fn record_event(&self, _event: &DnsEvent) {
            panic!("collector bug");
        }

        fn record_metrics(&self, _summary: &ResolutionSummary) {
            panic!("collector bug");
        }

        fn aggregated_stats(&self) -> AggregatedStats {
            AggregatedStats::default()
        }

        fn clear_stats(&self) {}
    }

    #[tokio::test]
    async fn test_event_order_on_fallback() {
        let log = Arc::new(EventLog::default());
        let engine = CascadeEngine::with_collector(log.clone());
        let resolvers = vec![
            fixed("Native", Err(ResolveError::TimedOut)),
            fixed("Empty", Ok(vec![])),
            fixed("Cloudflare", Ok(vec![ip("1.1.1.1")])),
        ];

        let addrs = engine.resolve("example.com", &resolvers).await.unwrap();
        assert_eq!(addrs, vec![ip("1.1.1.1")]);

        use DnsEventType::*;
        assert_eq!(
            *log.events.lock().unwrap(),
            vec![
                ResolveStart,
                ResolverAttemptStart,
                ResolverAttemptFailure,
                ResolverAttemptStart,
                ResolverAttemptEmpty,
                ResolverAttemptStart,
                ResolverAttemptSuccess,
                ResolveSuccess,
            ]
        );
        let summaries = log.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].used_resolver.as_deref(), Some("Cloudflare"));
    }

    #[tokio::test]
    async fn test_empty_results_fail_with_one_error_each() {
        let engine = CascadeEngine::new();
        let resolvers = vec![fixed("A", Ok(vec![])), fixed("B", Ok(vec![]))];

        let err = engine.resolve("x.test", &resolvers).await.unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.errors().all(ResolveError::is_empty_result));
    }

    #[tokio::test]
    async fn test_empty_attempt_recorded_as_responded() {
        let engine = CascadeEngine::new();
        let resolvers = vec![fixed("A", Ok(vec![])), fixed("B", Ok(vec![ip("10.0.0.1")]))];

        let (result, summary) = engine.resolve_with_summary("x.test", &resolvers).await;
        assert!(result.is_ok());
        assert!(summary.per_resolver_result["A"]);
        assert_eq!(summary.used_resolver.as_deref(), Some("B"));
        assert_eq!(summary.attempts[0].outcome, AttemptOutcome::Empty);
        assert!(summary.per_resolver_duration.contains_key("A"));
    }

    #[tokio::test]
    async fn test_no_resolvers() {
        let log = Arc::new(EventLog::default());
        let engine = CascadeEngine::with_collector(log.clone());

        let err = engine.resolve("x.test", &[]).await.unwrap_err();
        assert!(err.is_empty());
        assert_eq!(
            *log.events.lock().unwrap(),
            vec![DnsEventType::ResolveStart, DnsEventType::ResolveFailure]
        );
    }

    #[tokio::test]
    async fn test_panicking_collector_is_isolated() {
        let engine = CascadeEngine::with_collector(Arc::new(PanickingCollector));
        let resolvers = vec![
            fixed("A", Err(ResolveError::TimedOut)),
            fixed("B", Ok(vec![ip("10.0.0.2")])),
        ];

        let addrs = engine.resolve("x.test", &resolvers).await.unwrap();
        assert_eq!(addrs, vec![ip("10.0.0.2")]);
    }

    #[tokio::test]
    async fn test_cascade_resolver_nests() {
        let collector = Arc::new(InMemoryMetricsCollector::new());
        let inner = CascadeResolver::new(
            CascadeEngine::with_collector(collector.clone()),
            vec![
                fixed("A", Err(ResolveError::TimedOut)),
                fixed("B", Ok(vec![ip("10.0.0.3")])),
            ],
        );
        assert_eq!(inner.entries().len(), 2);

        let outer = vec![ResolverEntry::new("Inner", Arc::new(inner))];
        let addrs = CascadeEngine::new().resolve("x.test", &outer).await.unwrap();
        assert_eq!(addrs, vec![ip("10.0.0.3")]);
        assert_eq!(collector.aggregated_stats().total_success, 1);
    }

    #[tokio::test]
    async fn test_cascade_resolver_failure_maps_to_lookup() {
        let inner = CascadeResolver::new(
            CascadeEngine::new(),
            vec![fixed("A", Err(ResolveError::TimedOut))],
        );
        let err = inner.resolve(Name::new("x.test")).await.unwrap_err();
        assert!(matches!(err, ResolveError::Lookup { hostname, .. } if hostname == "x.test"));
    }
}
