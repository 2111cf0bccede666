//! Search job lifecycle operations.
//!
//! Each function is one call through the transport retrier and holds no state.
//!
//! # What this module handles:
//! - Creating search jobs
//! - Fetching job state snapshots
//! - Fetching a page of messages or records
//! - Deleting jobs
//!
//! # What this module does NOT handle:
//! - Reconciling result offsets with job state (see [`crate::client::poller`])

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::BasicCredentials;
use crate::endpoints::request::{ApiRequest, RetryPolicy, send_request_with_retry};
use crate::endpoints::url_encoding::encode_path_segment;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{CreateJobResponse, JobState, ResultKind, ResultsPage};

use super::types::SearchParams;

/// Path of the job collection, relative to the endpoint.
pub const JOBS_PATH: &str = "/search/jobs";

/// Metrics route of a single job.
pub const JOB_ROUTE: &str = "/search/jobs/{id}";

/// Metrics route of a job's results of the given kind.
pub fn results_route(kind: ResultKind) -> &'static str {
    match kind {
        ResultKind::Messages => "/search/jobs/{id}/messages",
        ResultKind::Records => "/search/jobs/{id}/records",
    }
}

fn job_path(job_id: &str) -> String {
    format!("{}/{}", JOBS_PATH, encode_path_segment(job_id))
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ClientError::InvalidResponse(format!("failed to parse {what}: {e}")))
}

/// Create a new search job and return its id.
///
/// `default_time_zone` applies unless `params` names a zone (see
/// [`SearchParams::effective_time_zone`]).
#[allow(clippy::too_many_arguments)]
pub async fn create_job(
    http: &Client,
    base_url: &str,
    credentials: &BasicCredentials,
    params: &SearchParams,
    default_time_zone: &str,
    policy: &RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<String> {
    // The query itself may contain sensitive literals; only its size is logged.
    debug!(
        query_len = params.query.len(),
        from = %params.from,
        to = %params.to,
        "Creating search job"
    );

    let body = params.to_body(default_time_zone)?;
    let request = ApiRequest::post(JOBS_PATH, JOBS_PATH).json(body);
    let response =
        send_request_with_retry(http, base_url, credentials, &request, policy, metrics).await?;

    let created: CreateJobResponse = parse_json(response, "job creation response").await?;
    let id = created
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ClientError::InvalidResponse("job creation response has no id".to_string()))?;

    debug!(job_id = %id, "Search job created");
    Ok(id)
}

/// Fetch the current state snapshot of a job.
pub async fn get_job_state(
    http: &Client,
    base_url: &str,
    credentials: &BasicCredentials,
    job_id: &str,
    policy: &RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<JobState> {
    let request = ApiRequest::get(JOB_ROUTE, job_path(job_id));
    let response =
        send_request_with_retry(http, base_url, credentials, &request, policy, metrics).await?;

    let state: JobState = parse_json(response, "job state").await?;
    debug!(
        job_id,
        state = %state.state,
        message_count = state.message_count,
        record_count = state.record_count,
        "Fetched job state"
    );
    Ok(state)
}

/// Fetch up to `limit` messages or records starting at `offset`.
///
/// Does not consult the job state; the caller owns offset bookkeeping.
#[allow(clippy::too_many_arguments)]
pub async fn get_results_page(
    http: &Client,
    base_url: &str,
    credentials: &BasicCredentials,
    job_id: &str,
    kind: ResultKind,
    offset: u64,
    limit: u64,
    policy: &RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<ResultsPage> {
    let request = ApiRequest::get(
        results_route(kind),
        format!("{}/{}", job_path(job_id), kind.as_str()),
    )
        .query("offset", offset)
        .query("limit", limit);
    let response =
        send_request_with_retry(http, base_url, credentials, &request, policy, metrics).await?;

    let page: ResultsPage = parse_json(response, "results page").await?;
    debug!(job_id, %kind, offset, items = page.len(), "Fetched results page");
    Ok(page)
}

/// Delete a job. Deleting releases the job's resources on the service.
pub async fn delete_job(
    http: &Client,
    base_url: &str,
    credentials: &BasicCredentials,
    job_id: &str,
    policy: &RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<()> {
    let request = ApiRequest::delete(JOB_ROUTE, job_path(job_id));
    send_request_with_retry(http, base_url, credentials, &request, policy, metrics).await?;
    debug!(job_id, "Search job deleted");
    Ok(())
}
