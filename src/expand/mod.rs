//! Query expansion collaborator
//!
//! Deep search turns one user query into several related queries before
//! dispatching them. The rewriting itself is supplied by the embedder.

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Expansion failure
#[derive(Debug, thiserror::Error)]
pub enum ExpansionError {
    #[error("rewrite failed: {0}")]
    Rewrite(String),

    #[error("query expanded to no searchable queries")]
    Empty,
}

/// Rewrites one query into an ordered list of queries
#[async_trait]
pub trait QueryExpander: Send + Sync {
    async fn expand(&self, query: &str) -> Result<Vec<String>, ExpansionError>;
}

/// Returns the query unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExpander;

#[async_trait]
impl QueryExpander for PassthroughExpander {
    async fn expand(&self, query: &str) -> Result<Vec<String>, ExpansionError> {
        Ok(vec![query.to_string()])
    }
}

/// Adapts an async closure into a [`QueryExpander`]
pub struct FnExpander<F, Fut> {
    func: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnExpander<F, Fut>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>, ExpansionError>> + Send,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            _fut: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> QueryExpander for FnExpander<F, Fut>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<String>, ExpansionError>> + Send,
{
    async fn expand(&self, query: &str) -> Result<Vec<String>, ExpansionError> {
        (self.func)(query.to_string()).await
    }
}
