//! Error types for the Sumo client.

use reqwest::header::HeaderMap;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during Sumo client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was obtained (connection refused, timeout, DNS, ...).
    ///
    /// Surfaced unchanged once the retry budget is spent.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-retryable error response. Carries the response status, headers and
    /// body for diagnostics.
    #[error("API error ({status}) at {url}: {message}{}", .code.as_ref().map(|c| format!(" [{c}]")).unwrap_or_default())]
    ApiError {
        status: u16,
        url: String,
        code: Option<String>,
        message: String,
        body: String,
        headers: HeaderMap,
    },

    /// 500/503 responses persisted past the retry budget.
    #[error("Exceeded retry count for 500/503 errors (last status {status}, {attempts} attempts)")]
    MaxRetriesExceeded { status: u16, attempts: usize },

    /// 429/504 responses persisted past the configured overload ceiling.
    #[error("Exceeded overload retry limit for 429/504 responses (last status {status}, {attempts} attempts)")]
    OverloadRetriesExceeded { status: u16, attempts: usize },

    /// Response could not be interpreted.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// The service reports the job as cancelled while it was being polled.
    #[error("Search job {job_id} has been canceled unexpectedly")]
    JobCancelled { job_id: String },

    /// The service force-paused the job, which this client does not support.
    #[error("Search job {job_id} has been force paused; this is not supported")]
    JobForcePaused { job_id: String },

    /// The polling operation was cancelled or superseded by a newer one.
    #[error("Search has been canceled")]
    SearchCanceled,

    /// A required client setting was not provided.
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Unknown timezone name.
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

impl ClientError {
    /// Check if an HTTP status code is retried against the bounded budget.
    ///
    /// - 500: Internal Server Error (backend error)
    /// - 503: Service Unavailable
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 500 | 503)
    }

    /// Check if an HTTP status code signals transient overload.
    ///
    /// - 429: Too Many Requests
    /// - 504: Gateway Timeout
    ///
    /// These are retried without consuming the retry budget.
    pub fn is_overload_status(status: u16) -> bool {
        matches!(status, 429 | 504)
    }

    /// True if the search ended because it was cancelled or superseded.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::SearchCanceled)
    }

    /// True if the remote job reached a state the poller cannot continue from.
    pub fn is_job_lifecycle_error(&self) -> bool {
        matches!(self, Self::JobCancelled { .. } | Self::JobForcePaused { .. })
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. }
            | Self::MaxRetriesExceeded { status, .. }
            | Self::OverloadRetriesExceeded { status, .. } => Some(*status),
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
