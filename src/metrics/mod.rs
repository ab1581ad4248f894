//! Metrics collection module
//!
//! An [`EventSink`] tracking batch counts, worker reliability and latency.

use crate::events::{EventSink, SearchEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Number of worker latencies kept for averaging
const LATENCY_WINDOW: usize = 100;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Batches started
    batches: AtomicU64,
    /// Batches that merged despite failed workers
    degraded_batches: AtomicU64,
    /// Workers that returned from the backend without error
    worker_successes: AtomicU64,
    /// Workers that recorded an error
    worker_failures: AtomicU64,
    /// Recent worker latencies in ms
    latencies: RwLock<VecDeque<u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            batches: AtomicU64::new(0),
            degraded_batches: AtomicU64::new(0),
            worker_successes: AtomicU64::new(0),
            worker_failures: AtomicU64::new(0),
            latencies: RwLock::new(VecDeque::with_capacity(LATENCY_WINDOW)),
        }
    }

    fn record_latency(&self, elapsed: Duration) {
        let mut latencies = self
            .latencies
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if latencies.len() >= LATENCY_WINDOW {
            latencies.pop_front();
        }
        latencies.push_back(elapsed.as_millis() as u64);
    }

    pub fn total_batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    pub fn degraded_batches(&self) -> u64 {
        self.degraded_batches.load(Ordering::Relaxed)
    }

    /// Average latency over the recent window
    pub fn avg_latency(&self) -> Option<Duration> {
        let latencies = self
            .latencies
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        if latencies.is_empty() {
            None
        } else {
            let avg = latencies.iter().sum::<u64>() / latencies.len() as u64;
            Some(Duration::from_millis(avg))
        }
    }

    /// Percentage of workers that succeeded
    pub fn reliability(&self) -> f64 {
        let successes = self.worker_successes.load(Ordering::Relaxed);
        let failures = self.worker_failures.load(Ordering::Relaxed);

        let total = successes + failures;
        if total == 0 {
            100.0
        } else {
            (successes as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches: self.total_batches(),
            degraded_batches: self.degraded_batches(),
            worker_successes: self.worker_successes.load(Ordering::Relaxed),
            worker_failures: self.worker_failures.load(Ordering::Relaxed),
            avg_latency: self.avg_latency(),
            reliability: self.reliability(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for Metrics {
    fn emit(&self, event: &SearchEvent) {
        match event {
            SearchEvent::BatchStarted { .. } => {
                self.batches.fetch_add(1, Ordering::Relaxed);
            }
            SearchEvent::WorkerCompleted { elapsed, .. } => {
                self.worker_successes.fetch_add(1, Ordering::Relaxed);
                self.record_latency(*elapsed);
            }
            SearchEvent::WorkerFailed { elapsed, .. } => {
                self.worker_failures.fetch_add(1, Ordering::Relaxed);
                self.record_latency(*elapsed);
            }
            SearchEvent::PartialFailure { .. } => {
                self.degraded_batches.fetch_add(1, Ordering::Relaxed);
            }
            SearchEvent::BatchCompleted { .. } => {}
        }
    }
}

/// Point-in-time copy of [`Metrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub batches: u64,
    pub degraded_batches: u64,
    pub worker_successes: u64,
    pub worker_failures: u64,
    pub avg_latency: Option<Duration>,
    pub reliability: f64,
}
