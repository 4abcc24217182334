//! Resolution instrumentation.
//!
//! - [`event`]: the per-resolution event stream
//! - [`summary`]: attempt records and the final [`ResolutionSummary`]
//! - [`stats`]: running per-resolver and per-hostname statistics
//! - [`collector`]: the [`MetricsCollector`] capability and its in-process variants
//! - [`forward`]: forwarding to an external analytics sink
//! - [`reporter`]: text and JSON reports over a stats snapshot

pub mod collector;
pub mod event;
pub mod forward;
pub mod reporter;
pub mod stats;
pub mod summary;

pub use collector::{
    CollectorConfig, CompositeMetricsCollector, InMemoryMetricsCollector, MetricsCollector,
    NoopMetricsCollector,
};
pub use event::{DnsEvent, DnsEventType};
pub use forward::{ForwardingMetricsCollector, JsonLinesSink, MetricsRecord, MetricsSink, SinkError};
pub use stats::{AggregatedStats, HostnameStats, RequestStats, ResolverStats};
pub use summary::{AttemptOutcome, AttemptRecord, ResolutionSummary};
