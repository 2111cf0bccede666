//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Build and validate the final `Config` from loaded values.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables when called after `from_env()`.
//! - Access id, access key and endpoint are mandatory; everything else has a default.
//! - The endpoint may be a URL or a deployment short name (`jp`, `us2`, ...).

use secrecy::SecretString;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_PAGE_LIMIT, DEFAULT_POLLING_DELAY_MS, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TIMEZONE, MAX_PAGE_LIMIT, MAX_RETRY_COUNT, MAX_TIMEOUT_SECS,
    deployment_endpoint,
};
use crate::types::{Config, ConnectionConfig, CredentialsConfig, SearchConfig};

/// Configuration loader that builds config from environment variables and overrides.
#[derive(Default)]
pub struct ConfigLoader {
    access_id: Option<String>,
    access_key: Option<SecretString>,
    endpoint: Option<String>,
    timezone: Option<String>,
    retry_delay: Option<Duration>,
    retry_count: Option<usize>,
    polling_delay: Option<Duration>,
    page_limit: Option<u64>,
    timeout: Option<Duration>,
    overload_retry_limit: Option<usize>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    /// Missing `.env` files are silently ignored.
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            tracing::debug!("DOTENV_DISABLED set, skipping .env");
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env file");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from `SUMO_*` environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Set the access id.
    pub fn with_access_id(mut self, id: String) -> Self {
        self.access_id = Some(id);
        self
    }

    /// Set the access key.
    pub fn with_access_key(mut self, key: String) -> Self {
        self.access_key = Some(SecretString::new(key.into()));
        self
    }

    /// Set the endpoint (URL or deployment short name).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set the default search timezone.
    pub fn with_timezone(mut self, timezone: String) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Set the delay between retry attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Set the retry budget for transport failures and 500/503 responses.
    pub fn with_retry_count(mut self, count: usize) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Set the delay between job state polls.
    pub fn with_polling_delay(mut self, delay: Duration) -> Self {
        self.polling_delay = Some(delay);
        self
    }

    /// Set the results page size.
    pub fn with_page_limit(mut self, limit: u64) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cap consecutive 429/504 retries.
    pub fn with_overload_retry_limit(mut self, limit: usize) -> Self {
        self.overload_retry_limit = Some(limit);
        self
    }

    /// Build the final configuration.
    ///
    /// # Errors
    ///
    /// Fails fast when the access id, access key or endpoint is missing, and
    /// when any provided value is out of range.
    pub fn build(self) -> Result<Config, ConfigError> {
        let access_id = self
            .access_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingAccessId)?;
        let access_key = self.access_key.ok_or(ConfigError::MissingAccessKey)?;
        let endpoint = self
            .endpoint
            .as_deref()
            .map(resolve_endpoint)
            .transpose()?
            .ok_or(ConfigError::MissingEndpoint)?;

        let timezone = self
            .timezone
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidTimezone(timezone));
        }

        let retry_count = self.retry_count.unwrap_or(DEFAULT_RETRY_COUNT);
        if retry_count > MAX_RETRY_COUNT {
            return Err(ConfigError::InvalidRetryCount {
                message: format!("must be between 0 and {MAX_RETRY_COUNT} (got {retry_count})"),
            });
        }

        let page_limit = self.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if page_limit == 0 || page_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::InvalidPageLimit {
                message: format!("must be between 1 and {MAX_PAGE_LIMIT} (got {page_limit})"),
            });
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() || timeout.as_secs() > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidTimeout {
                message: format!(
                    "must be between 1 and {MAX_TIMEOUT_SECS} seconds (got {})",
                    timeout.as_secs()
                ),
            });
        }

        Ok(Config {
            credentials: CredentialsConfig {
                access_id,
                access_key,
            },
            connection: ConnectionConfig {
                endpoint,
                timeout,
                retry_delay: self
                    .retry_delay
                    .unwrap_or(Duration::from_millis(DEFAULT_RETRY_DELAY_MS)),
                retry_count,
                overload_retry_limit: self.overload_retry_limit,
            },
            search: SearchConfig {
                timezone,
                polling_delay: self
                    .polling_delay
                    .unwrap_or(Duration::from_millis(DEFAULT_POLLING_DELAY_MS)),
                page_limit,
            },
        })
    }

    // Internal accessor methods for use by other loader modules

    pub(crate) fn set_access_id(&mut self, id: Option<String>) {
        self.access_id = id;
    }

    pub(crate) fn set_access_key(&mut self, key: Option<SecretString>) {
        self.access_key = key;
    }

    pub(crate) fn set_endpoint(&mut self, endpoint: Option<String>) {
        self.endpoint = endpoint;
    }

    pub(crate) fn set_timezone(&mut self, timezone: Option<String>) {
        self.timezone = timezone;
    }

    pub(crate) fn set_retry_delay(&mut self, delay: Option<Duration>) {
        self.retry_delay = delay;
    }

    pub(crate) fn set_retry_count(&mut self, count: Option<usize>) {
        self.retry_count = count;
    }

    pub(crate) fn set_polling_delay(&mut self, delay: Option<Duration>) {
        self.polling_delay = delay;
    }

    pub(crate) fn set_page_limit(&mut self, limit: Option<u64>) {
        self.page_limit = limit;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub(crate) fn set_overload_retry_limit(&mut self, limit: Option<usize>) {
        self.overload_retry_limit = limit;
    }
}

/// Resolves a deployment short name or validates and normalizes an endpoint URL.
///
/// Validation rules:
/// - Blank input counts as missing
/// - Known deployment names (`jp`, `us2`, ...) map to their API endpoint
/// - Otherwise the value must be an absolute http(s) URL with a host
/// - Trailing slashes are stripped
fn resolve_endpoint(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::MissingEndpoint);
    }

    let candidate = match deployment_endpoint(trimmed) {
        Some(endpoint) => {
            tracing::debug!(deployment = trimmed, endpoint, "Resolved deployment endpoint");
            endpoint
        }
        None => trimmed,
    };

    let parsed = url::Url::parse(candidate).map_err(|e| ConfigError::InvalidEndpoint {
        endpoint: trimmed.to_string(),
        message: format!("must be a deployment name or an absolute http(s) URL: {e}"),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: trimmed.to_string(),
            message: format!("scheme must be http or https, got: {scheme}"),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: trimmed.to_string(),
            message: "host is required".to_string(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
