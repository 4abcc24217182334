//! Human-readable and structured reports over an [`AggregatedStats`] snapshot.
//!
//! Pure functions; the snapshot is only read.

use super::stats::{AggregatedStats, RequestStats};
use std::fmt::Write;

/// Default number of hostnames in the text report.
pub const DEFAULT_TOP_HOSTNAMES: usize = 10;

fn percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

/// One-line overview, e.g. for periodic log output.
pub fn summary_line(stats: &AggregatedStats) -> String {
    format!(
        "requests={} success={} failure={} success_rate={} avg={:.2}ms",
        stats.total_requests,
        stats.total_success,
        stats.total_failure,
        percent(stats.success_rate()),
        stats.avg_duration_ms(),
    )
}

fn write_stats_line(out: &mut String, label: &str, stats: &RequestStats) {
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "  {label}: requests={} success={} failure={} rate={} avg={:.2}ms min={}ms max={}ms",
        stats.total_requests,
        stats.success_count,
        stats.failure_count,
        percent(stats.success_rate()),
        stats.avg_duration_ms(),
        stats.min_duration_ms,
        stats.max_duration_ms,
    );
}

/// Multi-line text report: totals, per-resolver breakdown in first-seen
/// order, then the `top_n` busiest hostnames.
pub fn text_report(stats: &AggregatedStats, top_n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== DNS Resolution Report ===");
    let _ = writeln!(out, "Total requests: {}", stats.total_requests);
    let _ = writeln!(out, "Successful: {}", stats.total_success);
    let _ = writeln!(out, "Failed: {}", stats.total_failure);
    let _ = writeln!(out, "Success rate: {}", percent(stats.success_rate()));
    let _ = writeln!(out, "Average duration: {:.2}ms", stats.avg_duration_ms());

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Resolvers ---");
    let resolvers = stats.resolvers_in_order();
    if resolvers.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (name, resolver) in resolvers {
        write_stats_line(&mut out, name, resolver);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Top {top_n} Hostnames ---");
    let hostnames = stats.top_hostnames(top_n);
    if hostnames.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (host, host_stats) in hostnames {
        write_stats_line(&mut out, host, host_stats);
    }

    if !stats.event_counts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Events ---");
        for (event_type, count) in &stats.event_counts {
            let _ = writeln!(out, "  {event_type}: {count}");
        }
    }

    out
}

#[cfg(feature = "json")]
fn stats_json(name: &str, stats: &RequestStats) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "total_requests": stats.total_requests,
        "success_count": stats.success_count,
        "failure_count": stats.failure_count,
        "success_rate": stats.success_rate(),
        "avg_duration_ms": stats.avg_duration_ms(),
        "min_duration_ms": stats.min_duration_ms,
        "max_duration_ms": stats.max_duration_ms,
    })
}

/// Structured report. Resolvers keep first-seen order; hostnames are
/// sorted by request volume.
#[cfg(feature = "json")]
pub fn json_report(stats: &AggregatedStats) -> serde_json::Value {
    let resolvers: Vec<_> = stats
        .resolvers_in_order()
        .into_iter()
        .map(|(name, s)| stats_json(name, s))
        .collect();
    let hostnames: Vec<_> = stats
        .top_hostnames(usize::MAX)
        .into_iter()
        .map(|(name, s)| stats_json(name, s))
        .collect();
    let events: serde_json::Map<String, serde_json::Value> = stats
        .event_counts
        .iter()
        .map(|(ty, count)| (ty.as_str().to_string(), serde_json::Value::from(*count)))
        .collect();

    serde_json::json!({
        "total_requests": stats.total_requests,
        "total_success": stats.total_success,
        "total_failure": stats.total_failure,
        "success_rate": stats.success_rate(),
        "avg_duration_ms": stats.avg_duration_ms(),
        "resolvers": resolvers,
        "hostnames": hostnames,
        "events": events,
    })
}
