//! CLI cancellation utilities.
//!
//! Responsibilities:
//! - Install the Ctrl+C handler that cancels the shared token.
//! - Define a single, recognizable `Cancelled` error for commands that stop
//!   waiting on a request because of Ctrl+C.
//! - Recognize user-initiated cancellation in an `anyhow::Error` chain.
//! - Centralize cancellation message and Unix-standard SIGINT exit code (130).
//!
//! Does NOT handle:
//! - Deleting the job on cancellation (the poller does that before returning).
//!
//! Invariants:
//! - Once cancelled, the token remains cancelled forever.
//! - A second Ctrl+C exits immediately with 130, skipping cleanup.

use std::fmt;

use sumo_client::{CancellationToken, ClientError};

/// Standard Unix exit code for SIGINT: 128 + 2.
pub const SIGINT_EXIT_CODE: u8 = 130;

/// Spawn a task that cancels `token` on the first Ctrl+C and exits the
/// process on the second.
pub fn install_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::debug!("Ctrl+C received, cancelling");
        token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("^C\nInterrupted again; exiting without cleanup");
            std::process::exit(i32::from(SIGINT_EXIT_CODE));
        }
    });
}

/// Marker error used when a command stops waiting because of Ctrl+C.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Returns true if this anyhow error represents a cancellation.
pub fn is_cancelled_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<Cancelled>()
            || cause
                .downcast_ref::<ClientError>()
                .is_some_and(ClientError::is_cancellation)
    })
}

/// Print standard cancellation message to stderr.
///
/// Search cancellation deletes the job first, so the message says so.
pub fn print_cancelled_message(err: &anyhow::Error) {
    let search = err.chain().any(|cause| {
        cause
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::is_cancellation)
    });
    if search {
        eprintln!("^C\nSearch cancelled by user; job deleted");
    } else {
        eprintln!("^C\nOperation cancelled by user");
    }
}
