//! Search execution and orchestration

use super::deadline::Deadline;
use super::models::{BatchReport, SearchTask};
use crate::backends::SearchBackend;
use crate::events::{EventSink, SearchEvent, TracingSink};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::error;

/// Default wall-clock budget for a batch
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

type Collector = Arc<Mutex<Vec<SearchTask>>>;

/// Fans a list of queries out to a backend, one worker per query
#[derive(Clone)]
pub struct Dispatcher {
    /// Budget shared by every worker of a batch
    deadline: Duration,
    /// Diagnostic sink
    sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    /// Create a dispatcher reporting to `sink`
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            sink,
        }
    }

    /// Set the batch deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Configured batch deadline
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run every query against `backend` and return one task per query, in
    /// completion order
    pub async fn dispatch(
        &self,
        queries: &[String],
        backend: Arc<dyn SearchBackend>,
        result_limit: usize,
    ) -> Vec<SearchTask> {
        self.dispatch_report(queries, backend, result_limit).await.0
    }

    /// Like [`Dispatcher::dispatch`], also returning the batch summary
    pub async fn dispatch_report(
        &self,
        queries: &[String],
        backend: Arc<dyn SearchBackend>,
        result_limit: usize,
    ) -> (Vec<SearchTask>, BatchReport) {
        let deadline = Deadline::after(self.deadline);
        self.dispatch_with_deadline(queries, backend, result_limit, deadline)
            .await
    }

    /// Run a batch under a caller-supplied deadline.
    ///
    /// Dropping the returned future before it resolves cancels `deadline`
    /// and aborts every worker still running.
    pub async fn dispatch_with_deadline(
        &self,
        queries: &[String],
        backend: Arc<dyn SearchBackend>,
        result_limit: usize,
        deadline: Deadline,
    ) -> (Vec<SearchTask>, BatchReport) {
        let start = Instant::now();
        self.sink.emit(&SearchEvent::BatchStarted {
            workers: queries.len(),
            deadline: deadline.remaining(),
        });

        let collected: Collector = Arc::new(Mutex::new(Vec::with_capacity(queries.len())));
        let mut guard = BatchGuard(Some(deadline.clone()));

        let mut running: FuturesUnordered<_> = queries
            .iter()
            .enumerate()
            .map(|(worker_id, query)| {
                let worker = Worker {
                    worker_id,
                    query: query.clone(),
                    backend: backend.clone(),
                    result_limit,
                    deadline: deadline.clone(),
                    sink: self.sink.clone(),
                    collected: collected.clone(),
                };
                let mut handle = AbortOnDrop(tokio::spawn(worker.run()));
                async move { (worker_id, (&mut handle.0).await) }
            })
            .collect();

        while let Some((worker_id, joined)) = running.next().await {
            if let Err(e) = joined {
                // A worker that never reached its append is a dispatch fault,
                // not a search failure: stop unstarted siblings and keep the
                // one-task-per-query count.
                error!("Worker {} aborted: {}", worker_id, e);
                deadline.cancel();

                let task = SearchTask::pending(worker_id, queries[worker_id].clone())
                    .abort(e.to_string());
                self.sink.emit(&SearchEvent::WorkerFailed {
                    worker_id,
                    query: task.query.clone(),
                    error: e.to_string(),
                    elapsed: task.elapsed,
                });
                collected.lock().await.push(task);
            }
        }

        guard.disarm();

        let tasks = std::mem::take(&mut *collected.lock().await);
        let report = BatchReport::from_tasks(&tasks, start.elapsed());
        self.sink.emit(&SearchEvent::BatchCompleted {
            report: report.clone(),
        });

        (tasks, report)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

/// Aborts the spawned worker if the batch stops polling it
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Cancels the batch deadline unless the join barrier was reached
struct BatchGuard(Option<Deadline>);

impl BatchGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        if let Some(deadline) = self.0.take() {
            deadline.cancel();
        }
    }
}

/// One worker's owned state
struct Worker {
    worker_id: usize,
    query: String,
    backend: Arc<dyn SearchBackend>,
    result_limit: usize,
    deadline: Deadline,
    sink: Arc<dyn EventSink>,
    collected: Collector,
}

impl Worker {
    async fn run(self) {
        let started = Instant::now();
        let task = SearchTask::pending(self.worker_id, self.query.clone());

        let task = if self.deadline.is_expired() {
            task.cancel(started.elapsed())
        } else {
            let outcome = self
                .backend
                .search(&self.query, self.result_limit, &self.deadline)
                .await;
            task.complete(outcome, started.elapsed())
        };

        let event = match &task.error {
            Some(e) => SearchEvent::WorkerFailed {
                worker_id: task.worker_id,
                query: task.query.clone(),
                error: e.to_string(),
                elapsed: task.elapsed,
            },
            None => SearchEvent::WorkerCompleted {
                worker_id: task.worker_id,
                query: task.query.clone(),
                elapsed: task.elapsed,
            },
        };
        self.sink.emit(&event);

        // Held for the push only.
        self.collected.lock().await.push(task);
    }
}
