//! Metrics collectors.
//!
//! A collector receives the event stream and the final summary of every
//! resolution. Three variants ship with the crate: [`NoopMetricsCollector`],
//! [`InMemoryMetricsCollector`] and the forwarding collector in
//! [`super::forward`]. Callers can plug in their own by implementing
//! [`MetricsCollector`].

use super::event::DnsEvent;
use super::stats::AggregatedStats;
use super::summary::ResolutionSummary;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Sink for resolution events and summaries.
///
/// Called from whatever task runs the resolution, so implementations must
/// be thread-safe and must not block for long.
pub trait MetricsCollector: Send + Sync {
    fn record_event(&self, event: &DnsEvent);

    fn record_metrics(&self, summary: &ResolutionSummary);

    /// Snapshot of the aggregated statistics, not a live view.
    fn aggregated_stats(&self) -> AggregatedStats;

    fn clear_stats(&self);
}

/// Collector used when instrumentation is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsCollector;

impl MetricsCollector for NoopMetricsCollector {
    #[inline]
    fn record_event(&self, _event: &DnsEvent) {}

    #[inline]
    fn record_metrics(&self, _summary: &ResolutionSummary) {}

    fn aggregated_stats(&self) -> AggregatedStats {
        AggregatedStats::default()
    }

    #[inline]
    fn clear_stats(&self) {}
}

/// Configuration for [`InMemoryMetricsCollector`].
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// Log every event at `debug` level.
    pub log_events: bool,
}

impl CollectorConfig {
    pub fn verbose() -> Self {
        Self { log_events: true }
    }
}

/// Aggregates statistics in process memory.
///
/// All state sits behind one mutex: each event or summary is applied as a
/// single critical section, so concurrent updates are never lost and a
/// snapshot never observes a half-applied summary.
#[derive(Debug, Default)]
pub struct InMemoryMetricsCollector {
    state: Mutex<AggregatedStats>,
    config: CollectorConfig,
}

impl InMemoryMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CollectorConfig) -> Self {
        Self {
            state: Mutex::new(AggregatedStats::default()),
            config,
        }
    }

    fn state(&self) -> MutexGuard<'_, AggregatedStats> {
        // A panic inside a critical section leaves whole counters behind;
        // keep serving them.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn record_event(&self, event: &DnsEvent) {
        if self.config.log_events {
            tracing::debug!(
                event = %event.event_type,
                hostname = %event.hostname,
                resolver = ?event.resolver_name,
                index = ?event.resolver_index,
                duration_ms = ?event.duration_ms,
                error = ?event.error,
                "dns event"
            );
        }
        self.state().record_event(event);
    }

    fn record_metrics(&self, summary: &ResolutionSummary) {
        if self.config.log_events {
            tracing::debug!(
                hostname = %summary.hostname,
                success = summary.success,
                resolver = ?summary.used_resolver,
                attempts = summary.attempted_resolvers.len(),
                duration_ms = summary.total_duration_ms,
                "dns resolution summary"
            );
        }
        self.state().record_summary(summary);
    }

    fn aggregated_stats(&self) -> AggregatedStats {
        self.state().clone()
    }

    fn clear_stats(&self) {
        *self.state() = AggregatedStats::default();
    }
}

/// Fans every event and summary out to several collectors.
///
/// The snapshot and `clear_stats` semantics follow the children: the
/// snapshot is the first child's, clearing clears all of them.
#[derive(Default, Clone)]
pub struct CompositeMetricsCollector {
    collectors: Vec<Arc<dyn MetricsCollector>>,
}

impl CompositeMetricsCollector {
    pub fn new(collectors: Vec<Arc<dyn MetricsCollector>>) -> Self {
        Self { collectors }
    }

    pub fn push(&mut self, collector: Arc<dyn MetricsCollector>) {
        self.collectors.push(collector);
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl CompositeMetricsCollector {
    /// Runs `call` on every child. A panicking child is logged and skipped
    /// so the remaining children still see the record.
    fn each(&self, operation: &'static str, call: impl Fn(&dyn MetricsCollector)) {
        for (index, collector) in self.collectors.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| call(&**collector))).is_err() {
                tracing::warn!(index, operation, "composite child collector panicked");
            }
        }
    }
}

impl MetricsCollector for CompositeMetricsCollector {
    fn record_event(&self, event: &DnsEvent) {
        self.each("record_event", |c| c.record_event(event));
    }

    fn record_metrics(&self, summary: &ResolutionSummary) {
        self.each("record_metrics", |c| c.record_metrics(summary));
    }

    fn aggregated_stats(&self) -> AggregatedStats {
        let Some(first) = self.collectors.first() else {
            return AggregatedStats::default();
        };
        catch_unwind(AssertUnwindSafe(|| first.aggregated_stats())).unwrap_or_else(|_| {
            tracing::warn!(operation = "aggregated_stats", "composite child collector panicked");
            AggregatedStats::default()
        })
    }

    fn clear_stats(&self) {
        self.each("clear_stats", |c| c.clear_stats());
    }
}

impl std::fmt::Debug for CompositeMetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMetricsCollector")
            .field("collectors", &self.collectors.len())
            .finish()
    }
}
