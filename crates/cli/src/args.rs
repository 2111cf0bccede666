//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//! - Parse search time bounds (RFC 3339 or epoch milliseconds).
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not validate configuration (see `sumo_config::ConfigLoader`).

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand, ValueEnum};
use sumo_client::AutoParsingMode;
use thiserror::Error;

use crate::commands;

#[derive(Parser)]
#[command(name = "sumo-cli")]
#[command(about = "Run Sumo Logic search jobs from the command line", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  sumo-cli search '_sourceCategory=web | count by status' --from 2024-01-01T00:00:00Z --to 2024-01-01T01:00:00Z --records\n  sumo-cli --endpoint us2 search 'error' --from 1704067200000 --to 1704070800000 --output ndjson\n  sumo-cli job status 750D3ABE4460BA73\n  sumo-cli job delete 750D3ABE4460BA73\n"
)]
pub struct Cli {
    /// Access id used for HTTP Basic authentication
    #[arg(long, global = true, env = "SUMO_ACCESS_ID")]
    pub access_id: Option<String>,

    /// Access key used for HTTP Basic authentication
    #[arg(long, global = true, env = "SUMO_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// API endpoint URL or deployment name (us1, us2, eu, au, de, ca, in, fed, jp)
    #[arg(long, global = true, env = "SUMO_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Default IANA timezone for search time ranges (e.g., Asia/Tokyo)
    #[arg(long, global = true, env = "SUMO_TIMEZONE")]
    pub timezone: Option<String>,

    /// Retries for connection failures and 500/503 responses
    #[arg(long, global = true, env = "SUMO_RETRY_COUNT")]
    pub retry_count: Option<usize>,

    /// Delay between retries in milliseconds
    #[arg(long, global = true, env = "SUMO_RETRY_DELAY_MS")]
    pub retry_delay_ms: Option<u64>,

    /// Delay between job state polls in milliseconds
    #[arg(long, global = true, env = "SUMO_POLLING_DELAY_MS")]
    pub polling_delay_ms: Option<u64>,

    /// Messages or records requested per results page
    #[arg(long, global = true, env = "SUMO_PAGE_LIMIT")]
    pub page_limit: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "SUMO_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Give up after this many consecutive 429/504 responses (default: retry indefinitely)
    #[arg(long, global = true, env = "SUMO_OVERLOAD_RETRY_LIMIT")]
    pub overload_retry_limit: Option<usize>,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true, value_name = "ADDR")]
    pub metrics_bind: Option<String>,

    /// Log output format (written to stderr; level controlled by RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Suppress progress messages on stderr
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a search job and print its results as they arrive
    Search {
        /// The search query (e.g., '_sourceCategory=web error')
        query: String,

        /// Start of the time range (RFC 3339 or epoch milliseconds)
        #[arg(long, value_parser = parse_time_arg, allow_hyphen_values = true)]
        from: DateTime<FixedOffset>,

        /// End of the time range (RFC 3339 or epoch milliseconds)
        #[arg(long, value_parser = parse_time_arg, allow_hyphen_values = true)]
        to: DateTime<FixedOffset>,

        /// Fetch aggregate records instead of raw messages
        #[arg(long)]
        records: bool,

        /// Search by receipt time instead of message time
        #[arg(long)]
        by_receipt_time: bool,

        /// Timezone for this search only (overrides --timezone)
        #[arg(long, value_name = "TZ")]
        search_timezone: Option<String>,

        /// Field extraction mode (intelligent or performance)
        #[arg(long, value_name = "MODE")]
        auto_parsing_mode: Option<AutoParsingMode>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Inspect or delete an existing search job
    Job {
        #[command(subcommand)]
        command: commands::job::JobCommand,
    },
}

/// Log line format for the stderr subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Output format for result items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One pretty-printed JSON document after the search completes
    Json,
    /// One JSON object per line, streamed as pages arrive
    Ndjson,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeArgError {
    #[error("expected an RFC 3339 timestamp (2024-01-01T00:00:00+09:00) or epoch milliseconds, got '{0}'")]
    Unrecognized(String),

    #[error("epoch milliseconds out of range: {0}")]
    OutOfRange(i64),
}

/// Parse a time bound given as RFC 3339 or as epoch milliseconds (UTC).
pub fn parse_time_arg(raw: &str) -> Result<DateTime<FixedOffset>, TimeArgError> {
    let trimmed = raw.trim();

    if let Ok(millis) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.fixed_offset())
            .ok_or(TimeArgError::OutOfRange(millis));
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map_err(|_| TimeArgError::Unrecognized(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_time_arg_rfc3339() {
        let parsed = parse_time_arg("2019-06-25T10:14:31+09:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2019-06-25T10:14:31+09:00");
    }

    #[test]
    fn test_parse_time_arg_epoch_millis() {
        let parsed = parse_time_arg("1561425271000").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2019-06-25T01:14:31+00:00");
    }

    #[test]
    fn test_parse_time_arg_rejects_garbage() {
        assert_eq!(
            parse_time_arg("yesterday"),
            Err(TimeArgError::Unrecognized("yesterday".to_string()))
        );
        assert!(matches!(
            parse_time_arg(&i64::MAX.to_string()),
            Err(TimeArgError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_search_args_parse() {
        let cli = Cli::try_parse_from([
            "sumo-cli",
            "search",
            "error",
            "--from",
            "2019-06-25T10:14:31+09:00",
            "--to",
            "1561450471000",
            "--records",
            "--auto-parsing-mode",
            "performance",
            "--output",
            "ndjson",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                query,
                records,
                auto_parsing_mode,
                output,
                ..
            } => {
                assert_eq!(query, "error");
                assert!(records);
                assert_eq!(auto_parsing_mode, Some(AutoParsingMode::Performance));
                assert_eq!(output, OutputFormat::Ndjson);
            }
            Commands::Job { .. } => panic!("expected search command"),
        }
    }
}
