//! Running resolution statistics.
//!
//! Plain data; the in-memory collector owns one [`AggregatedStats`] behind
//! a lock and hands out clones as snapshots.

use super::event::{DnsEvent, DnsEventType};
use super::summary::ResolutionSummary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Request counters and duration bounds for one key.
///
/// `success_count + failure_count == total_requests` always holds.
/// `min_duration_ms` is only meaningful once `total_requests > 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStats {
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_duration_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    /// Insertion order within the owning map.
    pub first_seen: u64,
}

/// Stats keyed by resolver name.
pub type ResolverStats = RequestStats;
/// Stats keyed by hostname.
pub type HostnameStats = RequestStats;

impl RequestStats {
    fn with_order(first_seen: u64) -> Self {
        Self {
            first_seen,
            ..Default::default()
        }
    }

    pub fn record(&mut self, success: bool, duration_ms: u64) {
        if self.total_requests == 0 {
            self.min_duration_ms = duration_ms;
            self.max_duration_ms = duration_ms;
        } else {
            self.min_duration_ms = self.min_duration_ms.min(duration_ms);
            self.max_duration_ms = self.max_duration_ms.max(duration_ms);
        }
        self.total_requests += 1;
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.total_duration_ms = self.total_duration_ms.saturating_add(duration_ms);
    }

    /// Fraction in `[0, 1]`; zero when nothing was recorded.
    pub fn success_rate(&self) -> f64 {
        ratio(self.success_count, self.total_requests)
    }

    pub fn avg_duration_ms(&self) -> f64 {
        ratio(self.total_duration_ms, self.total_requests)
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Point-in-time view of everything a collector has recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub total_requests: u64,
    pub total_success: u64,
    pub total_failure: u64,
    pub total_duration_ms: u64,
    pub resolver_stats: HashMap<String, ResolverStats>,
    pub hostname_stats: HashMap<String, HostnameStats>,
    pub event_counts: BTreeMap<DnsEventType, u64>,
}

impl AggregatedStats {
    pub fn is_empty(&self) -> bool {
        self.total_requests == 0 && self.event_counts.is_empty()
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.total_success, self.total_requests)
    }

    pub fn avg_duration_ms(&self) -> f64 {
        ratio(self.total_duration_ms, self.total_requests)
    }

    pub fn event_count(&self, event_type: DnsEventType) -> u64 {
        self.event_counts.get(&event_type).copied().unwrap_or(0)
    }

    /// Resolver stats ordered by first appearance.
    pub fn resolvers_in_order(&self) -> Vec<(&str, &ResolverStats)> {
        let mut entries: Vec<_> = self
            .resolver_stats
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        entries.sort_by_key(|(_, stats)| stats.first_seen);
        entries
    }

    /// Up to `n` hostnames with the most requests; ties keep first appearance.
    pub fn top_hostnames(&self, n: usize) -> Vec<(&str, &HostnameStats)> {
        let mut entries: Vec<_> = self
            .hostname_stats
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        entries.sort_by(|(_, a), (_, b)| {
            b.total_requests
                .cmp(&a.total_requests)
                .then(a.first_seen.cmp(&b.first_seen))
        });
        entries.truncate(n);
        entries
    }

    pub(crate) fn record_event(&mut self, event: &DnsEvent) {
        *self.event_counts.entry(event.event_type).or_insert(0) += 1;
    }

    /// Folds one resolution into the totals, per-resolver and per-hostname
    /// stats.
    pub(crate) fn record_summary(&mut self, summary: &ResolutionSummary) {
        self.total_requests += 1;
        if summary.success {
            self.total_success += 1;
        } else {
            self.total_failure += 1;
        }
        self.total_duration_ms = self
            .total_duration_ms
            .saturating_add(summary.total_duration_ms);

        for name in &summary.attempted_resolvers {
            let duration = summary
                .per_resolver_duration
                .get(name)
                .copied()
                .unwrap_or(0);
            let success = summary.per_resolver_result.get(name).copied().unwrap_or(false);
            let order = self.resolver_stats.len() as u64;
            self.resolver_stats
                .entry(name.clone())
                .or_insert_with(|| RequestStats::with_order(order))
                .record(success, duration);
        }

        let order = self.hostname_stats.len() as u64;
        self.hostname_stats
            .entry(summary.hostname.clone())
            .or_insert_with(|| RequestStats::with_order(order))
            .record(summary.success, summary.total_duration_ms);
    }
}
