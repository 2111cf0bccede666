//! Job lifecycle methods for [`SumoClient`].
//!
//! # What this module handles:
//! - Submitting, inspecting, paging and deleting a single job
//! - Creating pollers
//!
//! # What this module does NOT handle:
//! - Low-level endpoint HTTP calls (in [`crate::endpoints::search`])
//! - The polling loop (in [`crate::client::poller`])

use crate::client::SumoClient;
use crate::client::poller::SearchPoller;
use crate::endpoints;
use crate::endpoints::search::SearchParams;
use crate::error::Result;
use crate::models::{JobState, ResultKind, ResultsPage};

impl SumoClient {
    /// Submit a search job and return its id.
    ///
    /// `from`/`to` are qualified in the job's effective timezone: the one
    /// `params` names, otherwise the client's configured timezone.
    pub async fn submit_search(&self, params: &SearchParams) -> Result<String> {
        let policy = self.retry_policy();
        endpoints::create_job(
            &self.http,
            &self.config.endpoint,
            &self.credentials,
            params,
            &self.config.time_zone,
            &policy,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Fetch the current state snapshot of a job.
    pub async fn job_state(&self, job_id: &str) -> Result<JobState> {
        let policy = self.retry_policy();
        endpoints::get_job_state(
            &self.http,
            &self.config.endpoint,
            &self.credentials,
            job_id,
            &policy,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Fetch up to `page_limit` items starting at `offset`.
    ///
    /// This does not look at the job state; pair it with [`Self::job_state`]
    /// to know how many items exist.
    pub async fn results_page(
        &self,
        job_id: &str,
        kind: ResultKind,
        offset: u64,
    ) -> Result<ResultsPage> {
        let policy = self.retry_policy();
        endpoints::get_results_page(
            &self.http,
            &self.config.endpoint,
            &self.credentials,
            job_id,
            kind,
            offset,
            self.config.page_limit,
            &policy,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Delete a job.
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        let policy = self.retry_policy();
        endpoints::delete_job(
            &self.http,
            &self.config.endpoint,
            &self.credentials,
            job_id,
            &policy,
            self.metrics.as_ref(),
        )
        .await
    }

    /// Create a poller over the job's results of the given kind.
    ///
    /// Nothing is submitted until the first [`SearchPoller::next_batch`] call.
    pub fn search(&self, params: SearchParams, kind: ResultKind) -> SearchPoller {
        SearchPoller::new(self.clone(), params, kind)
    }

    /// Create a poller over raw messages.
    pub fn search_messages(&self, params: SearchParams) -> SearchPoller {
        self.search(params, ResultKind::Messages)
    }

    /// Create a poller over aggregate records.
    pub fn search_records(&self, params: SearchParams) -> SearchPoller {
        self.search(params, ResultKind::Records)
    }
}
