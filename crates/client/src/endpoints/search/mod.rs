//! Search job endpoints.
//!
//! # What this module handles:
//! - Job creation, state, result pages and deletion
//! - Search parameters and the job creation body
//!
//! # What this module does NOT handle:
//! - Polling (see [`crate::client::poller`])

pub mod jobs;
pub mod types;

pub use jobs::{JOB_ROUTE, JOBS_PATH, create_job, delete_job, get_job_state, get_results_page, results_route};
pub use types::{AutoParsingMode, SearchParams, format_timestamp};
