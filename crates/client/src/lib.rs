//! Sumo Logic search job API client.
//!
//! This crate drives the asynchronous search job API: it submits a query,
//! polls the job until results are available, and hands results back as a
//! sequence of pages. Requests go through a retrier that knows which HTTP
//! failures the service considers transient.

mod auth;
pub mod cancellation;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod metrics;
pub mod metrics_exporter;
pub mod models;
mod serde_helpers;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::BasicCredentials;
pub use cancellation::CancellationToken;
pub use client::builder::{ClientConfig, SumoClientBuilder};
pub use client::poller::{ScopedSearch, SearchBatch, SearchPoller};
pub use client::SumoClient;
pub use endpoints::request::RetryPolicy;
pub use endpoints::search::{AutoParsingMode, SearchParams};
pub use error::{ClientError, Result};
pub use metrics::{ErrorCategory, MetricsCollector};
pub use metrics_exporter::{MetricsExporter, MetricsExporterError};
pub use models::{
    Field, HistogramBucket, JobState, JobStatus, ResultItem, ResultKind, ResultsPage,
};
