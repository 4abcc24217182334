//! Forwarding collector for external analytics backends.
//!
//! Records are queued on a bounded channel and shipped by a background
//! task, so the resolution path never waits on the backend. A full queue
//! drops the record; a failing sink is logged and counted. Neither case
//! reaches the caller.

use super::collector::MetricsCollector;
use super::event::DnsEvent;
use super::stats::AggregatedStats;
use super::summary::ResolutionSummary;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// What gets shipped to a [`MetricsSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MetricsRecord {
    Event(DnsEvent),
    Summary(ResolutionSummary),
}

/// Error reported by a sink. Only ever logged.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Metrics sink error: {0}")]
pub struct SinkError(pub String);

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError(err.to_string())
    }
}

/// Alias for the `Future` returned by a sink.
pub type Sending = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send>>;

/// Outbound transport for metrics records.
pub trait MetricsSink: Send + Sync + 'static {
    fn send(&self, record: MetricsRecord) -> Sending;
}

impl<S: MetricsSink + ?Sized> MetricsSink for Arc<S> {
    fn send(&self, record: MetricsRecord) -> Sending {
        (**self).send(record)
    }
}

#[derive(Debug, Default)]
struct Counters {
    forwarded: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

/// Collector that forwards everything to a [`MetricsSink`].
///
/// Aggregation happens remotely, so [`aggregated_stats`](MetricsCollector::aggregated_stats)
/// always returns an empty snapshot.
#[derive(Clone)]
pub struct ForwardingMetricsCollector {
    sender: mpsc::Sender<MetricsRecord>,
    counters: Arc<Counters>,
}

impl ForwardingMetricsCollector {
    /// Starts the background forwarder on the current tokio runtime.
    ///
    /// The task ends once every clone of the collector is dropped and the
    /// queue has drained.
    pub fn spawn<S: MetricsSink>(sink: S, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<MetricsRecord>(capacity.max(1));
        let counters = Arc::new(Counters::default());
        let task_counters = Arc::clone(&counters);

        let handle = tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                match sink.send(record).await {
                    Ok(()) => {
                        task_counters.forwarded.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        task_counters.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %e, "metrics sink rejected record");
                    }
                }
            }
            tracing::debug!("metrics forwarder stopped");
        });

        (Self { sender, counters }, handle)
    }

    fn enqueue(&self, record: MetricsRecord) {
        if self.sender.try_send(record).is_err() {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records handed to the sink successfully.
    pub fn forwarded(&self) -> u64 {
        self.counters.forwarded.load(Ordering::Relaxed)
    }

    /// Records dropped because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Records the sink failed to deliver.
    pub fn failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }
}

impl MetricsCollector for ForwardingMetricsCollector {
    fn record_event(&self, event: &DnsEvent) {
        self.enqueue(MetricsRecord::Event(event.clone()));
    }

    fn record_metrics(&self, summary: &ResolutionSummary) {
        self.enqueue(MetricsRecord::Summary(summary.clone()));
    }

    fn aggregated_stats(&self) -> AggregatedStats {
        AggregatedStats::default()
    }

    fn clear_stats(&self) {}
}

impl std::fmt::Debug for ForwardingMetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingMetricsCollector")
            .field("forwarded", &self.forwarded())
            .field("dropped", &self.dropped())
            .field("failed", &self.failed())
            .finish()
    }
}

/// Sink writing one JSON document per line.
pub struct JsonLinesSink<W> {
    writer: Arc<Mutex<W>>,
}

impl<W: AsyncWrite + Unpin + Send + 'static> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> MetricsSink for JsonLinesSink<W> {
    fn send(&self, record: MetricsRecord) -> Sending {
        let writer = Arc::clone(&self.writer);
        Box::pin(async move {
            let mut line =
                serde_json::to_vec(&record).map_err(|e| SinkError(e.to_string()))?;
            line.push(b'\n');
            let mut writer = writer.lock().await;
            writer.write_all(&line).await?;
            writer.flush().await?;
            Ok(())
        })
    }
}
