//! Metrics collection for search API calls.
//!
//! This module records, through the `metrics` crate facade:
//! - Request latency histograms
//! - Request counters (total, retries, errors)
//! - Result pages delivered by the search poller
//!
//! # What this module does NOT handle:
//! - Metrics exposition (see [`crate::metrics_exporter`])
//!
//! # Invariants
//! - All metrics use consistent label names: `endpoint`, `method`, `status`, `error_category`
//! - Metric recording is infallible and never disrupts API calls
//! - Zero-cost when no metrics recorder is installed

use crate::error::ClientError;
use std::time::Duration;

/// Metric name for request duration histogram.
pub const METRIC_REQUEST_DURATION: &str = "sumo_api_request_duration_seconds";

/// Metric name for total request counter.
pub const METRIC_REQUESTS_TOTAL: &str = "sumo_api_requests_total";

/// Metric name for retry counter.
pub const METRIC_RETRIES_TOTAL: &str = "sumo_api_retries_total";

/// Metric name for error counter.
pub const METRIC_ERRORS_TOTAL: &str = "sumo_api_errors_total";

/// Metric name for delivered result pages.
pub const METRIC_SEARCH_PAGES_TOTAL: &str = "sumo_search_pages_total";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No response obtained (connection refused, DNS, reset)
    Transport,
    /// Request timeout
    Timeout,
    /// HTTP 4xx client errors
    Http4xx,
    /// HTTP 5xx server errors
    Http5xx,
    /// 500/503 retry budget spent
    RetriesExhausted,
    /// 429/504 overload ceiling reached
    Overload,
    /// Job reported cancelled or force paused
    JobLifecycle,
    /// Polling cancelled or superseded
    Canceled,
    /// Unknown/unclassified errors
    Unknown,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Transport => "transport",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Http4xx => "http_4xx",
            ErrorCategory::Http5xx => "http_5xx",
            ErrorCategory::RetriesExhausted => "retries_exhausted",
            ErrorCategory::Overload => "overload",
            ErrorCategory::JobLifecycle => "job_lifecycle",
            ErrorCategory::Canceled => "canceled",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::HttpError(e) if e.is_timeout() => ErrorCategory::Timeout,
            ClientError::HttpError(e) if e.is_connect() || e.is_request() => {
                ErrorCategory::Transport
            }
            ClientError::ApiError { status, .. } => match status {
                400..=499 => ErrorCategory::Http4xx,
                500..=599 => ErrorCategory::Http5xx,
                _ => ErrorCategory::Unknown,
            },
            ClientError::MaxRetriesExceeded { .. } => ErrorCategory::RetriesExhausted,
            ClientError::OverloadRetriesExceeded { .. } => ErrorCategory::Overload,
            ClientError::JobCancelled { .. } | ClientError::JobForcePaused { .. } => {
                ErrorCategory::JobLifecycle
            }
            ClientError::SearchCanceled => ErrorCategory::Canceled,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Metrics collector for search API calls.
///
/// A thin wrapper around the `metrics` macros that keeps label names consistent.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    enabled: bool,
}

impl MetricsCollector {
    /// Create an enabled metrics collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a collector that records nothing.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record the duration of one request attempt.
    ///
    /// `status` is `None` when no response was obtained.
    pub fn record_request_duration(
        &self,
        endpoint: &str,
        method: &str,
        duration: Duration,
        status: Option<u16>,
    ) {
        if !self.enabled {
            return;
        }

        let status_label = status.map_or("error".to_string(), |s| s.to_string());

        metrics::histogram!(METRIC_REQUEST_DURATION,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "status" => status_label,
        )
        .record(duration.as_secs_f64());
    }

    /// Record a request attempt, including retries.
    pub fn record_request(&self, endpoint: &str, method: &str) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_REQUESTS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
        )
        .increment(1);
    }

    /// Record a retry (not the initial attempt). `reason` is a status code or
    /// `"transport"`.
    pub fn record_retry(&self, endpoint: &str, method: &str, reason: &str) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_RETRIES_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "reason" => reason.to_string(),
        )
        .increment(1);
    }

    pub fn record_error(&self, endpoint: &str, method: &str, category: ErrorCategory) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_ERRORS_TOTAL,
            "endpoint" => endpoint.to_string(),
            "method" => method.to_string(),
            "error_category" => category.as_str(),
        )
        .increment(1);
    }

    /// Record an error, categorizing it automatically.
    pub fn record_client_error(&self, endpoint: &str, method: &str, error: &ClientError) {
        self.record_error(endpoint, method, ErrorCategory::from(error));
    }

    /// Record a result page handed to the caller by the poller.
    pub fn record_search_page(&self, kind: &'static str, items: usize) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_SEARCH_PAGES_TOTAL,
            "kind" => kind,
            "empty" => if items == 0 { "true" } else { "false" },
        )
        .increment(1);
    }
}
