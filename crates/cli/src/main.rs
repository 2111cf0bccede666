//! Sumo CLI - run Sumo Logic search jobs from the command line.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Run search jobs and job maintenance commands via the shared client library.
//! - Map failures to structured exit codes.
//!
//! Does NOT handle:
//! - Retry, polling or cleanup logic (see `crates/client`).
//! - Persistence of search results.
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Logs go to stderr; stdout carries only command output.

mod args;
mod cancellation;
mod commands;
mod dispatch;
mod error;

use std::time::Duration;

use args::{Cli, LogFormat};
use cancellation::{install_ctrl_c_handler, is_cancelled_error, print_cancelled_message};
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use sumo_client::CancellationToken;
use sumo_config::{Config, ConfigLoader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    let loader = match ConfigLoader::new().load_dotenv() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load environment: {}", e);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };

    let cli = Cli::parse();

    init_tracing(cli.log_format);

    // Initialize metrics exporter if --metrics-bind is provided
    let metrics_exporter = if let Some(ref bind_addr) = cli.metrics_bind {
        match sumo_client::MetricsExporter::install(bind_addr) {
            Ok(exporter) => {
                tracing::info!("Metrics exporter started on http://{}/metrics", bind_addr);
                Some(exporter)
            }
            Err(e) => {
                eprintln!("Failed to start metrics exporter: {}", e);
                std::process::exit(ExitCode::GeneralError.as_i32());
            }
        }
    } else {
        None
    };
    let metrics_enabled = metrics_exporter.is_some();

    let config = match build_config(loader, &cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to build configuration: {:#}", e);
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    };

    let cancel = CancellationToken::new();
    install_ctrl_c_handler(cancel.clone());

    let exit_code = match run_command(cli, config, metrics_enabled, &cancel).await {
        Ok(()) => ExitCode::Success,
        Err(e) if is_cancelled_error(&e) => {
            print_cancelled_message(&e);
            ExitCode::Interrupted
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

fn init_tracing(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Layer configuration: `.env` < environment < command-line flags.
fn build_config(loader: ConfigLoader, cli: &Cli) -> anyhow::Result<Config> {
    let mut loader = loader.from_env()?;

    if let Some(ref id) = cli.access_id {
        loader = loader.with_access_id(id.clone());
    }
    if let Some(ref key) = cli.access_key {
        loader = loader.with_access_key(key.clone());
    }
    if let Some(ref endpoint) = cli.endpoint {
        loader = loader.with_endpoint(endpoint.clone());
    }
    if let Some(ref tz) = cli.timezone {
        loader = loader.with_timezone(tz.clone());
    }
    if let Some(count) = cli.retry_count {
        loader = loader.with_retry_count(count);
    }
    if let Some(ms) = cli.retry_delay_ms {
        loader = loader.with_retry_delay(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.polling_delay_ms {
        loader = loader.with_polling_delay(Duration::from_millis(ms));
    }
    if let Some(limit) = cli.page_limit {
        loader = loader.with_page_limit(limit);
    }
    if let Some(secs) = cli.timeout {
        loader = loader.with_timeout(Duration::from_secs(secs));
    }
    if let Some(limit) = cli.overload_retry_limit {
        loader = loader.with_overload_retry_limit(limit);
    }

    Ok(loader.build()?)
}
