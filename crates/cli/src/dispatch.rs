//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//! - Build the client each command runs against.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Configuration loading (see `main()`).
//!
//! Invariants:
//! - Every command receives the process-wide cancellation token.

use anyhow::Result;
use sumo_client::CancellationToken;
use sumo_config::Config;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::commands::search::SearchArgs;

pub(crate) async fn run_command(
    cli: Cli,
    config: Config,
    metrics_enabled: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let client = commands::build_client(&config, metrics_enabled)?;

    match cli.command {
        Commands::Search {
            query,
            from,
            to,
            records,
            by_receipt_time,
            search_timezone,
            auto_parsing_mode,
            output,
        } => {
            let args = SearchArgs {
                query,
                from,
                to,
                records,
                by_receipt_time,
                search_timezone,
                auto_parsing_mode,
                output,
            };
            commands::search::run(client, args, cli.quiet, cancel).await?;
        }
        Commands::Job { command } => {
            commands::job::run(client, command, cli.quiet, cancel).await?;
        }
    }

    Ok(())
}
