//! Job command implementation.
//!
//! Responsibilities:
//! - Show the state of an existing job.
//! - Fetch one page of messages or records from an existing job.
//! - Delete a job.
//!
//! Does NOT handle:
//! - Submitting jobs (see `search`).
//!
//! Invariants:
//! - Each request is raced against the cancellation token, so Ctrl+C returns
//!   `Cancelled` even while the retrier is waiting on an overloaded service.

use anyhow::{Context, Result};
use clap::Subcommand;
use sumo_client::{CancellationToken, ResultKind, SumoClient};
use tracing::info;

use crate::cancellation::Cancelled;

#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// Show the state, counts and pending warnings of a job
    Status {
        /// Job id returned when the search was submitted
        id: String,
    },
    /// Fetch one page of results from a job
    Results {
        /// Job id returned when the search was submitted
        id: String,
        /// Offset of the first item to fetch
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Fetch aggregate records instead of raw messages
        #[arg(long)]
        records: bool,
    },
    /// Delete a job and release its resources on the service
    Delete {
        /// Job id returned when the search was submitted
        id: String,
    },
}

pub async fn run(
    client: SumoClient,
    command: JobCommand,
    quiet: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        JobCommand::Status { id } => {
            let state = tokio::select! {
                res = client.job_state(&id) => res,
                _ = cancel.cancelled() => return Err(Cancelled.into()),
            }
            .with_context(|| format!("Failed to get state of job {}", id))?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        JobCommand::Results {
            id,
            offset,
            records,
        } => {
            let kind = if records {
                ResultKind::Records
            } else {
                ResultKind::Messages
            };
            let page = tokio::select! {
                res = client.results_page(&id, kind, offset) => res,
                _ = cancel.cancelled() => return Err(Cancelled.into()),
            }
            .with_context(|| format!("Failed to fetch {} of job {}", kind.as_str(), id))?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        JobCommand::Delete { id } => {
            tokio::select! {
                res = client.delete_job(&id) => res,
                _ = cancel.cancelled() => return Err(Cancelled.into()),
            }
            .with_context(|| format!("Failed to delete job {}", id))?;
            info!(job_id = %id, "Job deleted");
            if !quiet {
                eprintln!("Deleted job {}", id);
            }
        }
    }

    Ok(())
}
