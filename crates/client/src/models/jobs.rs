//! Search job models.
//!
//! # What this module handles:
//! - Job creation response
//! - Job state snapshots, including the histogram and pending diagnostics
//!
//! # What this module does NOT handle:
//! - Polling logic (see [`crate::client::poller`])
//! - HTTP transport (see [`crate::endpoints::search`])

use serde::{Deserialize, Serialize};

use crate::models::results::ResultKind;

/// Response of `POST /search/jobs`.
#[derive(Debug, Deserialize, Clone)]
pub struct CreateJobResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub link: Option<serde_json::Value>,
}

/// Remote job status as reported by the service.
///
/// Unrecognized wire values are kept verbatim in [`JobStatus::Unknown`] and
/// treated like a job that is still gathering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    NotStarted,
    Gathering,
    DoneGathering,
    Cancelled,
    ForcePaused,
    Unknown(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "NOT STARTED",
            Self::Gathering => "GATHERING RESULTS",
            Self::DoneGathering => "DONE GATHERING RESULTS",
            Self::Cancelled => "CANCELLED",
            Self::ForcePaused => "FORCE PAUSED",
            Self::Unknown(raw) => raw,
        }
    }

    /// True once the service has finished collecting results. The state can
    /// no longer regress from here.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::DoneGathering)
    }
}

impl From<String> for JobStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "NOT STARTED" => Self::NotStarted,
            "GATHERING RESULTS" => Self::Gathering,
            "DONE GATHERING RESULTS" => Self::DoneGathering,
            "CANCELLED" => Self::Cancelled,
            "FORCE PAUSED" => Self::ForcePaused,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bucket of the job's message histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    #[serde(deserialize_with = "crate::serde_helpers::u64_from_string_or_number")]
    pub start_timestamp: u64,
    #[serde(deserialize_with = "crate::serde_helpers::u64_from_string_or_number")]
    pub length: u64,
    #[serde(deserialize_with = "crate::serde_helpers::u64_from_string_or_number")]
    pub count: u64,
}

/// Point-in-time snapshot of a search job (`GET /search/jobs/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    pub state: JobStatus,
    #[serde(
        default,
        deserialize_with = "crate::serde_helpers::u64_from_string_or_number"
    )]
    pub message_count: u64,
    #[serde(
        default,
        deserialize_with = "crate::serde_helpers::u64_from_string_or_number"
    )]
    pub record_count: u64,
    #[serde(default)]
    pub histogram_buckets: Vec<HistogramBucket>,
    #[serde(default)]
    pub pending_warnings: Vec<String>,
    #[serde(default)]
    pub pending_errors: Vec<String>,
}

impl JobState {
    /// Total number of items the job reports for the given result kind.
    pub fn total(&self, kind: ResultKind) -> u64 {
        match kind {
            ResultKind::Messages => self.message_count,
            ResultKind::Records => self.record_count,
        }
    }
}
