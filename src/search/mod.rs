//! Search orchestration module
//!
//! Fans queries out to a backend concurrently under one shared deadline,
//! collects every worker's outcome, and aggregates the batch.

pub mod aggregate;
mod deadline;
mod error;
mod executor;
mod models;
mod service;

pub use aggregate::BatchOutcome;
pub use deadline::{Deadline, DeadlineExceeded};
pub use error::{Result, SearchError};
pub use executor::{Dispatcher, DEFAULT_DEADLINE};
pub use models::*;
pub use service::{SearchService, SearchServiceBuilder};
