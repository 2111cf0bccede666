//! Configuration types for the Sumo search client.
//!
//! Responsibilities:
//! - Define credential, connection and search settings.
//! - Provide the combined `Config` produced by the loader.
//!
//! Does NOT handle:
//! - Configuration loading from env/`.env` (see `loader` module).
//! - Actual network connections (see client crate).
//!
//! Invariants:
//! - The access key is stored as `secrecy::SecretString` and never appears in `Debug` output.
//! - A `Config` is only produced by `ConfigLoader::build()`, which validates every field.

use secrecy::SecretString;
use std::time::Duration;

use crate::constants::{
    DEFAULT_PAGE_LIMIT, DEFAULT_POLLING_DELAY_MS, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TIMEZONE,
};

/// Access id / access key pair used for HTTP Basic authentication.
#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    pub access_id: String,
    pub access_key: SecretString,
}

/// Connection and retry settings.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// API endpoint, normalized without trailing slashes
    /// (e.g. `https://api.jp.sumologic.com/api/v1`).
    pub endpoint: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
    /// Retry budget for transport failures and 500/503 responses.
    pub retry_count: usize,
    /// Optional ceiling on consecutive 429/504 retries. `None` retries indefinitely.
    pub overload_retry_limit: Option<usize>,
}

/// Search defaults applied to every job submitted with this configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// IANA timezone name used to qualify `from`/`to`.
    pub timezone: String,
    /// Delay between job state polls.
    pub polling_delay: Duration,
    /// Number of messages or records requested per results page.
    pub page_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            polling_delay: Duration::from_millis(DEFAULT_POLLING_DELAY_MS),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Complete, validated client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub connection: ConnectionConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Create a configuration with default connection and search settings.
    pub fn new(access_id: String, access_key: SecretString, endpoint: String) -> Self {
        Self {
            credentials: CredentialsConfig {
                access_id,
                access_key,
            },
            connection: ConnectionConfig {
                endpoint,
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
                retry_count: DEFAULT_RETRY_COUNT,
                overload_retry_limit: None,
            },
            search: SearchConfig::default(),
        }
    }
}
