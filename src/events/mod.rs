//! Diagnostic event stream
//!
//! The dispatcher and the aggregation step report progress as typed
//! [`SearchEvent`]s into an injected [`EventSink`]. The core never logs
//! directly; [`TracingSink`] is the usual way to turn events into log lines.

use crate::search::BatchReport;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Progress and failure notifications from a batch
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A batch is about to spawn its workers
    BatchStarted { workers: usize, deadline: Duration },
    /// A worker's backend call returned successfully
    WorkerCompleted {
        worker_id: usize,
        query: String,
        elapsed: Duration,
    },
    /// A worker recorded an error (backend failure, cancellation or abort)
    WorkerFailed {
        worker_id: usize,
        query: String,
        error: String,
        elapsed: Duration,
    },
    /// Some, but not all, workers of a merged batch failed
    PartialFailure { failures: Vec<String> },
    /// Every worker has been joined
    BatchCompleted { report: BatchReport },
}

/// Receiver of [`SearchEvent`]s
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SearchEvent);
}

/// Renders events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &SearchEvent) {
        match event {
            SearchEvent::BatchStarted { workers, deadline } => {
                info!("Starting search with {} workers, deadline {:?}", workers, deadline);
            }
            SearchEvent::WorkerCompleted {
                worker_id,
                query,
                elapsed,
            } => {
                debug!(worker_id, query = %query, "Worker completed search in {:?}", elapsed);
            }
            SearchEvent::WorkerFailed {
                worker_id,
                query,
                error,
                ..
            } => {
                warn!(worker_id, query = %query, "Worker recorded error: {}", error);
            }
            SearchEvent::PartialFailure { failures } => {
                warn!("Some searches failed: {:?}", failures);
            }
            SearchEvent::BatchCompleted { report } => {
                info!(
                    total = report.total,
                    failed = report.failed,
                    "All searches completed in {:?}",
                    report.elapsed
                );
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &SearchEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SearchEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &SearchEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Delivers each event to several sinks in order
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &SearchEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
