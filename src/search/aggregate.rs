//! Merging and classification of collected tasks

use super::error::{Result, SearchError};
use super::models::SearchTask;

/// How a multi-query batch turned out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every worker succeeded and at least one returned text
    Complete { text: String },
    /// Some workers failed, the rest produced text
    Degraded { text: String, failures: Vec<String> },
    /// Every worker failed
    AllFailed { failures: Vec<String> },
    /// Nothing failed outright but no worker returned text
    Empty,
}

impl BatchOutcome {
    /// Collapse into the caller-facing result. Degraded batches succeed.
    pub fn into_result(self) -> Result<String> {
        match self {
            Self::Complete { text } | Self::Degraded { text, .. } => Ok(text),
            Self::AllFailed { failures } => Err(SearchError::AllFailed(failures)),
            Self::Empty => Err(SearchError::NoResults),
        }
    }
}

/// Space-join every non-empty payload in collection order
pub fn merge_text(tasks: &[SearchTask]) -> String {
    tasks
        .iter()
        .filter(|t| t.has_text())
        .map(|t| t.result_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify a collected batch
pub fn classify(tasks: &[SearchTask]) -> BatchOutcome {
    if tasks.is_empty() {
        return BatchOutcome::Empty;
    }

    let failures: Vec<String> = tasks.iter().filter_map(|t| t.failure_message()).collect();
    if failures.len() == tasks.len() {
        return BatchOutcome::AllFailed { failures };
    }

    let text = merge_text(tasks);
    if text.is_empty() {
        BatchOutcome::Empty
    } else if failures.is_empty() {
        BatchOutcome::Complete { text }
    } else {
        BatchOutcome::Degraded { text, failures }
    }
}

/// Single-query policy: surface the sole task's outcome directly
pub fn single(tasks: Vec<SearchTask>) -> Result<String> {
    let task = tasks.into_iter().next().ok_or(SearchError::NoResult)?;

    if let Some(e) = task.error {
        return Err(SearchError::Backend(e));
    }
    if task.result_text.is_empty() {
        return Err(SearchError::EmptyResult);
    }
    Ok(task.result_text)
}
