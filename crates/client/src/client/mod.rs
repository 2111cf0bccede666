//! Search API client.
//!
//! This module provides [`SumoClient`], the entry point for submitting search
//! jobs and polling them to completion.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//! - `search`: Job lifecycle methods
//! - [`poller`]: The polling state machine and its scoped wrapper
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Multiplexing unrelated jobs; one active poller per client is assumed
//!
//! # Invariants
//! - Clones share the HTTP pool, configuration and the operation counter, so
//!   they count as the same client for supersession
//! - Starting a poller or calling [`SumoClient::cancel`] advances the operation
//!   counter; a poller whose captured value no longer matches stops at its next
//!   iteration

pub mod builder;
pub mod poller;
mod search;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::auth::BasicCredentials;
use crate::endpoints::request::RetryPolicy;
use crate::metrics::MetricsCollector;

use builder::{ClientConfig, SumoClientBuilder};

/// Client for the search job API.
///
/// ```rust,ignore
/// use sumo_client::{SearchParams, SumoClient};
///
/// let client = SumoClient::builder()
///     .access_id("suABCDEF")
///     .access_key(key)
///     .endpoint("https://api.jp.sumologic.com/api/v1")
///     .build()?;
///
/// let mut poller = client.search_messages(SearchParams::new("error", from, to));
/// while let Some(batch) = poller.next_batch().await? {
///     println!("{} messages at offset {}", batch.page.len(), batch.offset);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SumoClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) credentials: BasicCredentials,
    pub(crate) operation: Arc<AtomicU64>,
    pub(crate) metrics: Option<MetricsCollector>,
}

impl SumoClient {
    /// Create a new client builder.
    pub fn builder() -> SumoClientBuilder {
        SumoClientBuilder::new()
    }

    /// Immutable settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn access_id(&self) -> &str {
        self.credentials.access_id()
    }

    /// Invalidate the active polling operation.
    ///
    /// The poller notices at its next iteration boundary, deletes its job and
    /// ends with [`crate::ClientError::SearchCanceled`]. Requests already in
    /// flight are not interrupted.
    pub fn cancel(&self) {
        let previous = self.operation.fetch_add(1, Ordering::SeqCst);
        debug!(operation = previous, "Cancelled active search operation");
    }

    /// Start a new operation, superseding any previous one. Returns its id.
    pub(crate) fn begin_operation(&self) -> u64 {
        self.operation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn current_operation(&self) -> u64 {
        self.operation.load(Ordering::SeqCst)
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy()
    }
}
