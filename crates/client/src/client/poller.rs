//! Polling state machine that turns an asynchronous search job into a
//! sequence of result batches.
//!
//! # What this module handles:
//! - Submitting the job lazily on the first [`SearchPoller::next_batch`] call
//! - Alternating state polls and result page fetches until everything the job
//!   reports has been downloaded
//! - Cooperative cancellation, both explicit ([`CancellationToken`]) and by
//!   supersession (a newer poller or [`SumoClient::cancel`] on the same client)
//! - Deleting the job when the sequence completes or is cancelled
//!
//! # What this module does NOT handle:
//! - Retrying failed requests (see [`crate::endpoints::request`])
//! - Cleanup of abandoned pollers. A [`SearchPoller`] dropped before it
//!   finishes leaves its job on the service until it expires; call
//!   [`SearchPoller::close`] or use [`ScopedSearch`].
//!
//! # Invariants
//! - Offsets handed out never decrease and never skip items: each batch starts
//!   where the previous one ended
//! - Once the job is observed `DONE GATHERING RESULTS` its state is not
//!   fetched again
//! - Cancellation is observed only between requests, never mid-request

use futures::Stream;
use tracing::{debug, info, warn};

use crate::cancellation::CancellationToken;
use crate::client::SumoClient;
use crate::endpoints::search::SearchParams;
use crate::error::{ClientError, Result};
use crate::models::{JobState, JobStatus, ResultItem, ResultKind, ResultsPage};

/// One step of a search: the job state it was fetched under and a page of
/// results starting at `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchBatch {
    pub state: JobState,
    pub page: ResultsPage,
    /// Offset of the first item of `page` within the job's results.
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Job not submitted yet.
    Start,
    /// Next step polls state (unless cached) and fetches a page.
    Polling,
    /// A batch was handed out; decide whether to finish, continue or wait.
    Yielded,
    /// Terminal. `next_batch` returns `Ok(None)`.
    Finished,
}

/// Drives one search job from submission to deletion.
///
/// Not re-entrant: each poller owns its offset cursor. Constructed through
/// [`SumoClient::search_messages`], [`SumoClient::search_records`] or
/// [`SumoClient::search`].
#[derive(Debug)]
pub struct SearchPoller {
    client: SumoClient,
    params: SearchParams,
    kind: ResultKind,
    token: Option<CancellationToken>,
    phase: Phase,
    operation: u64,
    job_id: Option<String>,
    last_state: Option<JobState>,
    offset: u64,
    cleaned_up: bool,
}

impl SearchPoller {
    pub(crate) fn new(client: SumoClient, params: SearchParams, kind: ResultKind) -> Self {
        Self {
            client,
            params,
            kind,
            token: None,
            phase: Phase::Start,
            operation: 0,
            job_id: None,
            last_state: None,
            offset: 0,
            cleaned_up: false,
        }
    }

    /// Stop at the next iteration boundary once `token` is cancelled. Also
    /// wakes the poller from its polling delay.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Id of the submitted job, once submitted.
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Number of items handed out so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Last observed job state.
    pub fn last_state(&self) -> Option<&JobState> {
        self.last_state.as_ref()
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Advance the search and return the next batch, or `None` once every
    /// reported item was handed out and the job was deleted.
    ///
    /// Pages may be empty while the job is still gathering.
    ///
    /// # Errors
    /// - [`ClientError::SearchCanceled`] after cancellation or supersession;
    ///   the job has been deleted (best effort)
    /// - [`ClientError::JobCancelled`] / [`ClientError::JobForcePaused`] when
    ///   the service reports those states
    /// - Any transport or API error from the underlying requests
    ///
    /// After an error the poller is finished and yields `Ok(None)`.
    pub async fn next_batch(&mut self) -> Result<Option<SearchBatch>> {
        let result = self.step().await;
        if result.is_err() {
            self.phase = Phase::Finished;
        }
        result
    }

    async fn step(&mut self) -> Result<Option<SearchBatch>> {
        loop {
            match self.phase {
                Phase::Finished => return Ok(None),
                Phase::Start => self.submit().await?,
                Phase::Yielded => {
                    let done = self.cached_done_state();
                    let total = self.last_state.as_ref().map_or(0, |s| s.total(self.kind));
                    if done && self.offset >= total {
                        self.finish().await?;
                        return Ok(None);
                    }
                    if !done {
                        self.wait().await;
                    }
                    self.phase = Phase::Polling;
                }
                Phase::Polling => {
                    if let Some(batch) = self.poll_once().await? {
                        self.phase = Phase::Yielded;
                        return Ok(Some(batch));
                    }
                }
            }
        }
    }

    async fn submit(&mut self) -> Result<()> {
        if self.token_cancelled() {
            debug!("Search cancelled before submission");
            return Err(ClientError::SearchCanceled);
        }

        self.operation = self.client.begin_operation();
        let job_id = self.client.submit_search(&self.params).await?;
        info!(job_id = %job_id, kind = %self.kind, "Search job submitted");

        self.job_id = Some(job_id);
        self.phase = Phase::Polling;
        Ok(())
    }

    /// One polling iteration. Returns `None` when the job has not started yet
    /// and the caller should iterate again.
    async fn poll_once(&mut self) -> Result<Option<SearchBatch>> {
        self.ensure_not_cancelled().await?;

        let job_id = self.require_job_id()?;
        let state = self.refresh_state(&job_id).await?;

        match &state.state {
            JobStatus::NotStarted => {
                debug!(job_id = %job_id, "Search job not started yet");
                self.wait().await;
                return Ok(None);
            }
            JobStatus::Cancelled => return Err(ClientError::JobCancelled { job_id }),
            JobStatus::ForcePaused => return Err(ClientError::JobForcePaused { job_id }),
            JobStatus::Unknown(raw) => {
                debug!(job_id = %job_id, state = %raw, "Unrecognized job state, treating as gathering");
            }
            JobStatus::Gathering | JobStatus::DoneGathering => {}
        }

        let page = self
            .client
            .results_page(&job_id, self.kind, self.offset)
            .await?;

        let total = state.total(self.kind);
        if state.state.is_done() && page.is_empty() && self.offset < total {
            return Err(ClientError::InvalidResponse(format!(
                "job {job_id} reports {total} {} but returned none at offset {}",
                self.kind, self.offset
            )));
        }

        if let Some(m) = &self.client.metrics {
            m.record_search_page(self.kind.as_str(), page.len());
        }

        let batch = SearchBatch {
            state,
            page,
            offset: self.offset,
        };
        self.offset += batch.page.len() as u64;
        debug!(
            job_id = %job_id,
            offset = batch.offset,
            items = batch.page.len(),
            total,
            "Fetched search batch"
        );
        Ok(Some(batch))
    }

    /// Return the cached state once the job is done gathering, otherwise
    /// fetch and cache a fresh one.
    async fn refresh_state(&mut self, job_id: &str) -> Result<JobState> {
        if let Some(state) = &self.last_state
            && state.state.is_done()
        {
            return Ok(state.clone());
        }

        let state = self.client.job_state(job_id).await?;
        self.last_state = Some(state.clone());
        Ok(state)
    }

    fn cached_done_state(&self) -> bool {
        self.last_state
            .as_ref()
            .is_some_and(|s| s.state.is_done())
    }

    fn token_cancelled(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn superseded(&self) -> bool {
        self.client.current_operation() != self.operation
    }

    async fn ensure_not_cancelled(&mut self) -> Result<()> {
        let superseded = self.superseded();
        if !superseded && !self.token_cancelled() {
            return Ok(());
        }

        info!(
            job_id = self.job_id.as_deref().unwrap_or_default(),
            superseded,
            "Search cancelled, deleting job"
        );
        self.delete_quietly().await;
        Err(ClientError::SearchCanceled)
    }

    /// Sleep for the polling delay, waking early if the token is cancelled.
    async fn wait(&self) {
        let delay = self.client.config.polling_delay;
        match &self.token {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = token.cancelled() => {}
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }

    fn require_job_id(&self) -> Result<String> {
        self.job_id
            .clone()
            .ok_or_else(|| ClientError::InvalidResponse("search job was not submitted".to_string()))
    }

    /// Successful completion: delete the job. A deletion failure is surfaced.
    async fn finish(&mut self) -> Result<()> {
        self.phase = Phase::Finished;
        if let Some(job_id) = self.pending_job_id() {
            self.client.delete_job(&job_id).await?;
            self.cleaned_up = true;
            info!(job_id = %job_id, items = self.offset, "Search completed");
        }
        Ok(())
    }

    /// Cleanup after cancellation. Failures are logged and never replace the
    /// cancellation error.
    async fn delete_quietly(&mut self) {
        if let Some(job_id) = self.pending_job_id() {
            // Marked after the attempt; a dropped future leaves the job to `close`.
            if let Err(e) = self.client.delete_job(&job_id).await {
                warn!(job_id = %job_id, error = %e, "Failed to delete cancelled search job");
            }
            self.cleaned_up = true;
        }
    }

    /// Job id if a job was submitted and not yet deleted.
    fn pending_job_id(&self) -> Option<String> {
        if self.cleaned_up {
            None
        } else {
            self.job_id.clone()
        }
    }

    /// Stop polling and delete the job if it still exists.
    pub async fn close(&mut self) -> Result<()> {
        self.phase = Phase::Finished;
        if let Some(job_id) = self.pending_job_id() {
            self.cleaned_up = true;
            self.client.delete_job(&job_id).await?;
            debug!(job_id = %job_id, "Search job closed");
        }
        Ok(())
    }

    /// Drain the poller and return every item in offset order.
    pub async fn collect_all(mut self) -> Result<Vec<ResultItem>> {
        let mut items = Vec::new();
        while let Some(batch) = self.next_batch().await? {
            items.extend(batch.page.items);
        }
        Ok(items)
    }

    /// Convert into a stream of batches. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<SearchBatch>> {
        futures::stream::try_unfold(self, |mut poller| async move {
            let batch = poller.next_batch().await?;
            Ok::<_, ClientError>(batch.map(|batch| (batch, poller)))
        })
    }
}

/// A [`SearchPoller`] that deletes its job when dropped before completion.
///
/// Deletion on drop is spawned onto the current tokio runtime and is best
/// effort; outside a runtime it is skipped with a warning. Prefer
/// [`ScopedSearch::close`] when the caller can await.
#[derive(Debug)]
pub struct ScopedSearch {
    poller: SearchPoller,
}

impl ScopedSearch {
    pub fn new(poller: SearchPoller) -> Self {
        Self { poller }
    }

    pub async fn next_batch(&mut self) -> Result<Option<SearchBatch>> {
        self.poller.next_batch().await
    }

    pub fn poller(&self) -> &SearchPoller {
        &self.poller
    }

    /// Delete the job now if it still exists.
    pub async fn close(mut self) -> Result<()> {
        self.poller.close().await
    }
}

impl From<SearchPoller> for ScopedSearch {
    fn from(poller: SearchPoller) -> Self {
        Self::new(poller)
    }
}

impl Drop for ScopedSearch {
    fn drop(&mut self) {
        let Some(job_id) = self.poller.pending_job_id() else {
            return;
        };
        self.poller.cleaned_up = true;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let client = self.poller.client.clone();
                debug!(job_id = %job_id, "Deleting abandoned search job");
                handle.spawn(async move {
                    if let Err(e) = client.delete_job(&job_id).await {
                        warn!(job_id = %job_id, error = %e, "Failed to delete abandoned search job");
                    }
                });
            }
            Err(_) => {
                warn!(job_id = %job_id, "No tokio runtime available; search job left on the service");
            }
        }
    }
}
