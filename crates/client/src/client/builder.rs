//! Client builder for constructing [`SumoClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Failing fast when access id, access key or endpoint is missing
//! - Normalizing the endpoint (removing trailing slashes)
//! - Configuring the underlying HTTP client (timeout, redirects)
//!
//! # What this module does NOT handle:
//! - Reading configuration from the environment (see the `sumo-config` crate)
//! - Retry logic (see [`crate::endpoints::request`])
//!
//! # Invariants
//! - The produced [`ClientConfig`] is never mutated after `build()`
//! - The endpoint never ends with `/`

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use secrecy::SecretString;
use sumo_config::{
    Config,
    constants::{
        DEFAULT_MAX_REDIRECTS, DEFAULT_PAGE_LIMIT, DEFAULT_POLLING_DELAY_MS, DEFAULT_RETRY_COUNT,
        DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_TIMEZONE,
    },
};

use crate::auth::BasicCredentials;
use crate::client::SumoClient;
use crate::endpoints::request::RetryPolicy;
use crate::endpoints::search::types::parse_time_zone;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Immutable settings of a [`SumoClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API endpoint without trailing slash, e.g. `https://api.jp.sumologic.com/api/v1`.
    pub endpoint: String,
    /// Default IANA timezone for job timestamps.
    pub time_zone: String,
    pub retry_delay: Duration,
    pub retry_count: usize,
    pub overload_retry_limit: Option<usize>,
    pub polling_delay: Duration,
    /// Items requested per results page.
    pub page_limit: u64,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retry_delay: self.retry_delay,
            retry_count: self.retry_count,
            overload_retry_limit: self.overload_retry_limit,
        }
    }
}

/// Builder for creating a new [`SumoClient`].
///
/// Access id, access key and endpoint are required; every other setting has
/// a default from `sumo_config::constants`.
///
/// ```rust,ignore
/// use sumo_client::SumoClient;
/// use secrecy::SecretString;
///
/// let client = SumoClient::builder()
///     .access_id("suABCDEF")
///     .access_key(SecretString::new("key".to_string().into()))
///     .endpoint("https://api.jp.sumologic.com/api/v1/")
///     .polling_delay(Duration::from_secs(2))
///     .build()?;
/// ```
#[derive(Debug)]
pub struct SumoClientBuilder {
    access_id: Option<String>,
    access_key: Option<SecretString>,
    endpoint: Option<String>,
    time_zone: String,
    retry_delay: Duration,
    retry_count: usize,
    overload_retry_limit: Option<usize>,
    polling_delay: Duration,
    page_limit: u64,
    timeout: Duration,
    metrics: Option<MetricsCollector>,
}

impl Default for SumoClientBuilder {
    fn default() -> Self {
        Self {
            access_id: None,
            access_key: None,
            endpoint: None,
            time_zone: DEFAULT_TIMEZONE.to_string(),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            retry_count: DEFAULT_RETRY_COUNT,
            overload_retry_limit: None,
            polling_delay: Duration::from_millis(DEFAULT_POLLING_DELAY_MS),
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            metrics: None,
        }
    }
}

impl SumoClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_id(mut self, access_id: impl Into<String>) -> Self {
        self.access_id = Some(access_id.into());
        self
    }

    pub fn access_key(mut self, access_key: SecretString) -> Self {
        self.access_key = Some(access_key);
        self
    }

    /// Set the API endpoint. Trailing slashes are removed.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the default IANA timezone (default `Asia/Tokyo`).
    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = time_zone.into();
        self
    }

    /// Set the fixed delay between retries (default 1s).
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the retry budget for transport failures and 500/503 (default 3).
    /// Zero disables these retries.
    pub fn retry_count(mut self, count: usize) -> Self {
        self.retry_count = count;
        self
    }

    /// Cap consecutive 429/504 retries. Unset means retry indefinitely.
    pub fn overload_retry_limit(mut self, limit: Option<usize>) -> Self {
        self.overload_retry_limit = limit;
        self
    }

    /// Set the delay between job state polls (default 1s).
    pub fn polling_delay(mut self, delay: Duration) -> Self {
        self.polling_delay = delay;
        self
    }

    /// Set the number of items per results page (default 50000).
    pub fn page_limit(mut self, limit: u64) -> Self {
        self.page_limit = limit;
        self
    }

    /// Set the per-request HTTP timeout (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record request metrics through the given collector.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Pre-fill the builder from a loaded [`Config`].
    pub fn from_config(mut self, config: &Config) -> Self {
        self.access_id = Some(config.credentials.access_id.clone());
        self.access_key = Some(config.credentials.access_key.clone());
        self.endpoint = Some(config.connection.endpoint.clone());
        self.time_zone = config.search.timezone.clone();
        self.retry_delay = config.connection.retry_delay;
        self.retry_count = config.connection.retry_count;
        self.overload_retry_limit = config.connection.overload_retry_limit;
        self.polling_delay = config.search.polling_delay;
        self.page_limit = config.search.page_limit;
        self.timeout = config.connection.timeout;
        self
    }

    /// Remove trailing slashes so paths can be appended directly.
    ///
    /// - `"https://api.jp.sumologic.com/api/v1/"` -> `"https://api.jp.sumologic.com/api/v1"`
    /// - `"http://127.0.0.1:8080//"` -> `"http://127.0.0.1:8080"`
    fn normalize_endpoint(endpoint: &str) -> String {
        endpoint.trim().trim_end_matches('/').to_string()
    }

    /// Build the [`SumoClient`].
    ///
    /// # Errors
    /// - [`ClientError::MissingConfig`] if access id, access key or endpoint is missing or empty
    /// - [`ClientError::InvalidUrl`] if the endpoint is not an http(s) URL
    /// - [`ClientError::InvalidTimezone`] if the timezone is not a known IANA name
    /// - [`ClientError::HttpError`] if the HTTP client fails to build
    pub fn build(self) -> Result<SumoClient> {
        let access_id = self
            .access_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ClientError::MissingConfig("access_id"))?;
        let access_key = self
            .access_key
            .ok_or(ClientError::MissingConfig("access_key"))?;
        let endpoint = self
            .endpoint
            .as_deref()
            .map(Self::normalize_endpoint)
            .filter(|e| !e.is_empty())
            .ok_or(ClientError::MissingConfig("endpoint"))?;

        let parsed = reqwest::Url::parse(&endpoint)
            .map_err(|e| ClientError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{endpoint}: scheme must be http or https"
            )));
        }
        parse_time_zone(&self.time_zone)?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS))
            .build()?;

        let config = ClientConfig {
            endpoint,
            time_zone: self.time_zone,
            retry_delay: self.retry_delay,
            retry_count: self.retry_count,
            overload_retry_limit: self.overload_retry_limit,
            polling_delay: self.polling_delay,
            // A zero limit could never make progress.
            page_limit: self.page_limit.max(1),
            timeout: self.timeout,
        };

        Ok(SumoClient {
            http,
            config: Arc::new(config),
            credentials: BasicCredentials::new(access_id, access_key),
            operation: Arc::new(AtomicU64::new(0)),
            metrics: self.metrics,
        })
    }
}
