//! Backend traits and types

use crate::search::Deadline;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::marker::PhantomData;

/// Error returned by a backend call
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to serialize search results: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Encode a structured provider response as the opaque payload string
pub fn encode_payload<T: Serialize + ?Sized>(response: &T) -> Result<String, BackendError> {
    Ok(serde_json::to_string(response)?)
}

/// A search capability the dispatcher fans queries out to.
///
/// `max_results` is the per-call cap resolved from the result-limit key of
/// the call pattern. The deadline is shared by the whole batch; honouring it
/// is up to the implementation.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name, used in diagnostics
    fn name(&self) -> &str;

    /// Run one query and return the opaque result payload
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        deadline: &Deadline,
    ) -> Result<String, BackendError>;
}

/// Adapts an async closure
/// `(query, max_results, deadline) -> Result<String, BackendError>` into a
/// [`SearchBackend`]. The closure receives a clone of the batch deadline.
pub struct FnBackend<F, Fut> {
    name: String,
    func: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnBackend<F, Fut>
where
    F: Fn(String, usize, Deadline) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BackendError>> + Send,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _fut: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> SearchBackend for FnBackend<F, Fut>
where
    F: Fn(String, usize, Deadline) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, BackendError>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
        deadline: &Deadline,
    ) -> Result<String, BackendError> {
        (self.func)(query.to_string(), max_results, deadline.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fn_backend() {
        let backend = FnBackend::new("echo", |query: String, limit: usize, _deadline: Deadline| async move {
            Ok::<_, BackendError>(format!("{query}:{limit}"))
        });
        let deadline = Deadline::after(Duration::from_secs(1));

        assert_eq!(backend.name(), "echo");
        let text = backend.search("rust", 4, &deadline).await.unwrap();
        assert_eq!(text, "rust:4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fn_backend_sees_batch_deadline() {
        let backend = FnBackend::new("watcher", |_query: String, _limit: usize, deadline: Deadline| async move {
            deadline.expired().await;
            Err::<String, _>(BackendError::Timeout)
        });
        let deadline = Deadline::after(Duration::from_secs(60));
        let canceller = deadline.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let start = tokio::time::Instant::now();
        let result = backend.search("rust", 1, &deadline).await;
        assert!(matches!(result, Err(BackendError::Timeout)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_encode_payload() {
        #[derive(Serialize)]
        struct Hit<'a> {
            title: &'a str,
            score: f64,
        }

        let text = encode_payload(&[Hit { title: "tokio", score: 0.9 }]).unwrap();
        assert_eq!(text, r#"[{"title":"tokio","score":0.9}]"#);

        // JSON object keys must be strings
        let bad: std::collections::HashMap<Vec<u8>, u32> = [(vec![1u8], 1)].into_iter().collect();
        let err = encode_payload(&bad).unwrap_err();
        assert!(matches!(err, BackendError::Serialization(_)));
        assert!(err.to_string().starts_with("failed to serialize search results"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            BackendError::Request("502 bad gateway".into()).to_string(),
            "request failed: 502 bad gateway"
        );
        assert_eq!(BackendError::Timeout.to_string(), "request timed out");
    }
}
