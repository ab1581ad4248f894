//! Search error types

use super::models::TaskError;
use crate::backends::BackendVariant;
use crate::expand::ExpansionError;

/// Error returned by the aggregation call patterns
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("empty search query provided")]
    EmptyInput,

    #[error("failed to expand query: {0}")]
    Expansion(#[from] ExpansionError),

    #[error(transparent)]
    Backend(TaskError),

    #[error("all searches failed: [{}]", .0.join("; "))]
    AllFailed(Vec<String>),

    #[error("no results found")]
    NoResults,

    #[error("no results returned from search")]
    NoResult,

    #[error("empty result returned from search")]
    EmptyResult,

    #[error("no backend registered for variant {0}")]
    BackendUnavailable(BackendVariant),
}

pub type Result<T> = std::result::Result<T, SearchError>;
