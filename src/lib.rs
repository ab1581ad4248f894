//! fanout-search: concurrent fan-out/fan-in search orchestration
//!
//! A list of queries is dispatched to a pluggable [`SearchBackend`], one
//! worker per query, under a single shared deadline. Every worker's outcome
//! is collected independently and the batch is classified as a full
//! success, a degraded success (some workers failed) or a failure.
//!
//! ```rust,no_run
//! use fanout_search::backends::{BackendError, FnBackend, SearchBackend};
//! use fanout_search::search::Deadline;
//! use fanout_search::{config, SearchService};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = config::load(None)?;
//! let service = SearchService::from_settings(&settings, |profile| {
//!     let backend: Arc<dyn SearchBackend> = Arc::new(FnBackend::new(
//!         profile.variant.as_str(),
//!         move |query: String, limit: usize, deadline: Deadline| {
//!             let depth = profile.depth;
//!             async move {
//!                 let text = format!("{limit} {depth:?} results for {query}");
//!                 deadline.guard(async { text }).await.map_err(|_| BackendError::Timeout)
//!             }
//!         },
//!     ));
//!     Some(backend)
//! });
//!
//! let text = service.deep_search("concurrent programming").await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod events;
pub mod expand;
pub mod logging;
pub mod metrics;
pub mod search;

pub use backends::{BackendVariant, SearchBackend};
pub use config::Settings;
pub use events::{EventSink, SearchEvent};
pub use search::{Dispatcher, SearchError, SearchService, SearchTask};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
