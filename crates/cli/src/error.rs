//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map ClientError variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Signal handling (see cancellation.rs for SIGINT handling).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use sumo_client::ClientError;

use crate::cancellation::SIGINT_EXIT_CODE;

/// Structured exit codes for sumo-cli.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// Unhandled or generic failure, including configuration errors.
    GeneralError = 1,

    /// HTTP 401. Scripts should check the access id and key.
    AuthenticationFailed = 2,

    /// No response from the service after the retry budget was spent.
    ///
    /// Scripts may retry with exponential backoff.
    ConnectionError = 3,

    /// HTTP 404, usually an expired or already deleted job.
    NotFound = 4,

    /// HTTP 400, e.g. a malformed query or time range.
    ///
    /// Scripts should fix the input and not retry the same request.
    ValidationError = 5,

    /// HTTP 403.
    PermissionDenied = 6,

    /// Overload (429/504) retry ceiling reached.
    ///
    /// Scripts should back off and retry later.
    RateLimited = 7,

    /// Retry count exceeded for 500/503 responses.
    ServiceUnavailable = 8,

    /// The service cancelled or force paused the job.
    JobLifecycle = 9,

    /// SIGINT/Ctrl+C (128 + 2).
    Interrupted = SIGINT_EXIT_CODE,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::ApiError { status: 401, .. } => ExitCode::AuthenticationFailed,
            ClientError::ApiError { status: 403, .. } => ExitCode::PermissionDenied,
            ClientError::ApiError { status: 404, .. } => ExitCode::NotFound,
            ClientError::ApiError { status: 400, .. } => ExitCode::ValidationError,
            ClientError::ApiError { .. } => ExitCode::GeneralError,

            // Transport failures are surfaced unchanged once retries run out
            ClientError::HttpError(e) => {
                if e.is_connect() || e.is_timeout() || e.is_request() {
                    ExitCode::ConnectionError
                } else {
                    ExitCode::GeneralError
                }
            }

            ClientError::OverloadRetriesExceeded { .. } => ExitCode::RateLimited,
            ClientError::MaxRetriesExceeded { .. } => ExitCode::ServiceUnavailable,

            ClientError::JobCancelled { .. } | ClientError::JobForcePaused { .. } => {
                ExitCode::JobLifecycle
            }
            ClientError::SearchCanceled => ExitCode::Interrupted,

            ClientError::InvalidUrl(_) | ClientError::InvalidTimezone(_) => {
                ExitCode::ValidationError
            }
            ClientError::MissingConfig(_) | ClientError::InvalidResponse(_) => {
                ExitCode::GeneralError
            }
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no ClientError is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        self.chain()
            .find_map(|cause| cause.downcast_ref::<ClientError>())
            .map_or(ExitCode::GeneralError, ExitCode::from)
    }
}
