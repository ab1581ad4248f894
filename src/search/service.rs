//! Single-query and deep-search call patterns

use super::aggregate::{self, BatchOutcome};
use super::error::{Result, SearchError};
use super::executor::{Dispatcher, DEFAULT_DEADLINE};
use crate::backends::{BackendProfile, BackendRegistry, BackendVariant, SearchBackend};
use crate::config::{LimitKey, ResultLimits, Settings};
use crate::events::{EventSink, SearchEvent, TracingSink};
use crate::expand::{ExpansionError, PassthroughExpander, QueryExpander};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Search front end: picks a backend, dispatches, aggregates
pub struct SearchService {
    dispatcher: Dispatcher,
    backends: BackendRegistry,
    expander: Arc<dyn QueryExpander>,
    limits: ResultLimits,
    sink: Arc<dyn EventSink>,
}

impl SearchService {
    pub fn builder() -> SearchServiceBuilder {
        SearchServiceBuilder::default()
    }

    /// Service configured from settings, logging through `tracing`.
    ///
    /// `factory` builds the backend for each variant from its profile, see
    /// [`BackendRegistry::load`].
    pub fn from_settings<F>(settings: &Settings, factory: F) -> Self
    where
        F: FnMut(BackendProfile) -> Option<Arc<dyn SearchBackend>>,
    {
        Self::builder()
            .backends(BackendRegistry::load(&settings.backend, factory))
            .limits(settings.result_limits())
            .deadline(settings.deadline())
            .build()
    }

    /// Run one query through the standard backend
    pub async fn search_one(&self, query: &str) -> Result<String> {
        self.search_with(BackendVariant::Standard, query).await
    }

    /// Run one query through the news backend
    pub async fn search_news(&self, query: &str) -> Result<String> {
        self.search_with(BackendVariant::News, query).await
    }

    /// Run one query through the recency-limited news backend
    pub async fn search_raw_news(&self, query: &str) -> Result<String> {
        self.search_with(BackendVariant::RawNews, query).await
    }

    /// Run one query through the backend registered for `variant`
    pub async fn search_with(&self, variant: BackendVariant, query: &str) -> Result<String> {
        if query.is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let backend = self.backend(variant)?;
        let limit = self.limits.get(variant.limit_key());
        let tasks = self
            .dispatcher
            .dispatch(&[query.to_string()], backend, limit)
            .await;

        aggregate::single(tasks)
    }

    /// Expand `query` and run the expansions as one merged batch
    pub async fn deep_search(&self, query: &str) -> Result<String> {
        if query.is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let expanded: Vec<String> = self
            .expander
            .expand(query)
            .await?
            .into_iter()
            .filter(|q| !q.trim().is_empty())
            .collect();
        if expanded.is_empty() {
            return Err(ExpansionError::Empty.into());
        }

        debug!("Expanded query into {} searches", expanded.len());
        self.search_many(&expanded).await
    }

    /// Run already-expanded queries through the deep backend and merge them
    pub async fn search_many(&self, queries: &[String]) -> Result<String> {
        if queries.is_empty() {
            return Err(SearchError::EmptyInput);
        }

        let backend = self.backend(BackendVariant::Deep)?;
        let limit = self.limits.get(LimitKey::Deep);
        let tasks = self.dispatcher.dispatch(queries, backend, limit).await;

        let outcome = aggregate::classify(&tasks);
        if let BatchOutcome::Degraded { failures, .. } = &outcome {
            self.sink.emit(&SearchEvent::PartialFailure {
                failures: failures.clone(),
            });
        }
        outcome.into_result()
    }

    /// Registered backends
    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Batch deadline used by every call
    pub fn deadline(&self) -> Duration {
        self.dispatcher.deadline()
    }

    fn backend(&self, variant: BackendVariant) -> Result<Arc<dyn SearchBackend>> {
        self.backends
            .get(variant)
            .cloned()
            .ok_or(SearchError::BackendUnavailable(variant))
    }
}

/// Builder for [`SearchService`]
pub struct SearchServiceBuilder {
    backends: BackendRegistry,
    expander: Arc<dyn QueryExpander>,
    limits: ResultLimits,
    deadline: Duration,
    sink: Arc<dyn EventSink>,
}

impl Default for SearchServiceBuilder {
    fn default() -> Self {
        Self {
            backends: BackendRegistry::new(),
            expander: Arc::new(PassthroughExpander),
            limits: ResultLimits::default(),
            deadline: DEFAULT_DEADLINE,
            sink: Arc::new(TracingSink),
        }
    }
}

impl SearchServiceBuilder {
    pub fn backends(mut self, backends: BackendRegistry) -> Self {
        self.backends = backends;
        self
    }

    /// Register a backend for one variant
    pub fn backend(mut self, variant: BackendVariant, backend: Arc<dyn SearchBackend>) -> Self {
        self.backends.register(variant, backend);
        self
    }

    pub fn expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = expander;
        self
    }

    pub fn limits(mut self, limits: ResultLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn build(self) -> SearchService {
        SearchService {
            dispatcher: Dispatcher::new(self.sink.clone()).with_deadline(self.deadline),
            backends: self.backends,
            expander: self.expander,
            limits: self.limits,
            sink: self.sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{BackendError, FnBackend};
    use crate::events::CollectingSink;
    use crate::expand::FnExpander;
    use crate::search::Deadline;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn counting(calls: Arc<AtomicUsize>) -> Arc<dyn SearchBackend> {
        Arc::new(FnBackend::new("counting", move |query: String, limit: usize, _deadline: Deadline| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BackendError>(format!("{query}#{limit}"))
            }
        }))
    }

    fn limits() -> ResultLimits {
        ResultLimits {
            standard: 2,
            deep: 6,
        }
    }

    #[tokio::test]
    async fn test_search_one_uses_standard_limit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = SearchService::builder()
            .backends(BackendRegistry::new().with_all(counting(calls.clone())))
            .limits(limits())
            .build();

        let text = assert_ok!(service.search_one("rust").await);
        assert_eq!(text, "rust#2");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let news = assert_ok!(service.search_raw_news("rust").await);
        assert_eq!(news, "rust#6");
    }

    #[tokio::test]
    async fn test_empty_input_never_calls_backend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = SearchService::builder()
            .backends(BackendRegistry::new().with_all(counting(calls.clone())))
            .build();

        assert!(matches!(service.search_one("").await, Err(SearchError::EmptyInput)));
        assert!(matches!(service.deep_search("").await, Err(SearchError::EmptyInput)));
        assert!(matches!(service.search_many(&[]).await, Err(SearchError::EmptyInput)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_backend() {
        let service = SearchService::builder().build();
        let err = assert_err!(service.search_news("rust").await);
        assert!(matches!(err, SearchError::BackendUnavailable(BackendVariant::News)));
    }

    #[tokio::test]
    async fn test_deep_search_expands_and_uses_deep_limit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let expander = FnExpander::new(|query: String| async move {
            Ok::<_, ExpansionError>(vec![format!("{query} a"), String::new(), format!("{query} b")])
        });
        let service = SearchService::builder()
            .backend(BackendVariant::Deep, counting(calls.clone()))
            .expander(Arc::new(expander))
            .limits(limits())
            .build();

        let text = assert_ok!(service.deep_search("rust").await);
        assert!(text.contains("rust a#6"));
        assert!(text.contains("rust b#6"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expansion_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let expander = FnExpander::new(|_query: String| async {
            Err::<Vec<String>, _>(ExpansionError::Rewrite("model offline".into()))
        });
        let service = SearchService::builder()
            .backend(BackendVariant::Deep, counting(calls.clone()))
            .expander(Arc::new(expander))
            .build();

        let err = assert_err!(service.deep_search("rust").await);
        assert!(matches!(err, SearchError::Expansion(ExpansionError::Rewrite(_))));
        assert_eq!(err.to_string(), "failed to expand query: rewrite failed: model offline");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_emits_diagnostic() {
        let sink = Arc::new(CollectingSink::new());
        let backend = Arc::new(FnBackend::new("abc", |query: String, _n: usize, _deadline: Deadline| async move {
            match query.as_str() {
                "a" => Ok("R1".to_string()),
                "b" => Err(BackendError::Request("rate limited".into())),
                _ => Ok("R3".to_string()),
            }
        }));
        let service = SearchService::builder()
            .backend(BackendVariant::Deep, backend)
            .sink(sink.clone())
            .build();

        let queries = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let text = assert_ok!(service.search_many(&queries).await);

        assert!(text == "R1 R3" || text == "R3 R1", "got {text:?}");
        let partial: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SearchEvent::PartialFailure { failures } => Some(failures),
                _ => None,
            })
            .collect();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].len(), 1);
        assert!(partial[0][0].starts_with("worker 1:"));
    }

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.search.deadline_secs = 5.0;
        let service = SearchService::from_settings(&settings, |_profile| None);
        assert_eq!(service.deadline(), Duration::from_secs(5));
        assert!(service.backends().is_empty());
    }

    #[tokio::test]
    async fn test_from_settings_passes_backend_settings() {
        let mut settings = Settings::default();
        settings.merge_vars([("TAVILY_API_KEY", "tvly-1"), ("MAXRESULTS", "4")]);
        settings.backend.news_days = 9;

        let service = SearchService::from_settings(&settings, |profile| {
            let backend: Arc<dyn SearchBackend> = Arc::new(FnBackend::new(
                "profiled",
                move |query: String, limit: usize, _deadline: Deadline| {
                    let profile = profile.clone();
                    async move {
                        let key = profile.api_key.unwrap_or_default();
                        let days = profile.days.unwrap_or(0);
                        Ok::<_, BackendError>(format!("{query}:{limit}:{key}:{days}"))
                    }
                },
            ));
            Some(backend)
        });

        assert_eq!(assert_ok!(service.search_one("q").await), "q:4:tvly-1:0");
        assert_eq!(assert_ok!(service.search_raw_news("q").await), "q:3:tvly-1:9");
    }

    #[tokio::test]
    async fn test_unbounded_deadline_setting_still_searches() {
        let mut settings = Settings::default();
        settings.merge_vars([("FANOUT_DEADLINE_SECS", "1e19")]);

        let service = SearchService::from_settings(&settings, |_profile| {
            let backend: Arc<dyn SearchBackend> = Arc::new(FnBackend::new(
                "echo",
                |query: String, _limit: usize, _deadline: Deadline| async move {
                    Ok::<_, BackendError>(query)
                },
            ));
            Some(backend)
        });

        assert_eq!(assert_ok!(service.search_one("q").await), "q");
    }
}
