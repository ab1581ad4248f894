//! Search task and batch data models

use crate::backends::BackendError;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Why a worker produced no usable result
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("search failed: {0}")]
    Backend(#[from] BackendError),

    #[error("search canceled before start: deadline exceeded")]
    CanceledBeforeStart,

    #[error("worker aborted: {0}")]
    Aborted(String),
}

/// One query's unit of work and its outcome
#[derive(Debug, Serialize)]
pub struct SearchTask {
    /// The query string
    pub query: String,
    /// Backend payload, empty when the call failed or returned nothing
    #[serde(rename = "results")]
    pub result_text: String,
    /// Index of the query in the dispatched list
    pub worker_id: usize,
    /// Wall clock from worker start to completion or cancellation
    #[serde(rename = "time_spent_ms", serialize_with = "duration_millis")]
    pub elapsed: Duration,
    #[serde(serialize_with = "error_message")]
    pub error: Option<TaskError>,
}

impl SearchTask {
    /// Fresh task for a worker, outcome fields zeroed
    pub fn pending(worker_id: usize, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            result_text: String::new(),
            worker_id,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    /// Record a backend outcome
    pub fn complete(mut self, outcome: Result<String, BackendError>, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        match outcome {
            Ok(text) => self.result_text = text,
            Err(e) => self.error = Some(TaskError::Backend(e)),
        }
        self
    }

    /// Record that the deadline fired before the worker started
    pub fn cancel(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self.error = Some(TaskError::CanceledBeforeStart);
        self
    }

    /// Record an infrastructure fault in the worker itself
    pub fn abort(mut self, reason: impl Into<String>) -> Self {
        self.error = Some(TaskError::Aborted(reason.into()));
        self
    }

    /// Whether the task recorded an error
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the task succeeded with a non-empty payload
    pub fn has_text(&self) -> bool {
        !self.result_text.is_empty()
    }

    /// `"worker {id}: {error}"`, if the task failed
    pub fn failure_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("worker {}: {}", self.worker_id, e))
    }
}

/// Summary of one dispatched batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Tasks in the batch, one per query
    pub total: usize,
    /// Tasks without an error, empty payloads included
    pub succeeded: usize,
    pub failed: usize,
    /// Wall clock from dispatch to the join barrier
    #[serde(serialize_with = "duration_millis")]
    pub elapsed: Duration,
    /// Slowest worker and its elapsed time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slowest: Option<(usize, u64)>,
}

impl BatchReport {
    /// Summarize collected tasks
    pub fn from_tasks(tasks: &[SearchTask], elapsed: Duration) -> Self {
        let failed = tasks.iter().filter(|t| t.is_failed()).count();
        let slowest = tasks
            .iter()
            .max_by_key(|t| t.elapsed)
            .map(|t| (t.worker_id, t.elapsed.as_millis() as u64));

        Self {
            total: tasks.len(),
            succeeded: tasks.len() - failed,
            failed,
            elapsed,
            slowest,
        }
    }
}

fn duration_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

fn error_message<S: Serializer>(e: &Option<TaskError>, s: S) -> Result<S::Ok, S::Error> {
    match e {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}
