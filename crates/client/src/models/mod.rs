//! Data models for search job API responses.
//!
//! Types are organized by resource in submodules and re-exported here
//! for convenient access.

pub mod jobs;
pub mod results;

pub use jobs::{CreateJobResponse, HistogramBucket, JobState, JobStatus};
pub use results::{Field, ResultItem, ResultKind, ResultsPage};
