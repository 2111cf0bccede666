//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `SUMO_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return ConfigError::InvalidValue.

use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parse a numeric environment variable, if set.
fn parse_env<T: FromStr>(var: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                message: expected.to_string(),
            })
        })
        .transpose()
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(id) = env_var_or_none("SUMO_ACCESS_ID") {
        loader.set_access_id(Some(id));
    }
    if let Some(key) = env_var_or_none("SUMO_ACCESS_KEY") {
        loader.set_access_key(Some(SecretString::new(key.into())));
    }
    if let Some(endpoint) = env_var_or_none("SUMO_ENDPOINT") {
        loader.set_endpoint(Some(endpoint));
    }
    if let Some(tz) = env_var_or_none("SUMO_TIMEZONE") {
        loader.set_timezone(Some(tz));
    }
    if let Some(ms) = parse_env::<u64>("SUMO_RETRY_DELAY_MS", "must be a number of milliseconds")? {
        loader.set_retry_delay(Some(Duration::from_millis(ms)));
    }
    if let Some(count) =
        parse_env::<usize>("SUMO_RETRY_COUNT", "must be a non-negative integer")?
    {
        loader.set_retry_count(Some(count));
    }
    if let Some(ms) =
        parse_env::<u64>("SUMO_POLLING_DELAY_MS", "must be a number of milliseconds")?
    {
        loader.set_polling_delay(Some(Duration::from_millis(ms)));
    }
    if let Some(limit) = parse_env::<u64>("SUMO_PAGE_LIMIT", "must be a positive integer")? {
        loader.set_page_limit(Some(limit));
    }
    if let Some(secs) = parse_env::<u64>("SUMO_TIMEOUT", "must be a number of seconds")? {
        loader.set_timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(limit) = parse_env::<usize>(
        "SUMO_OVERLOAD_RETRY_LIMIT",
        "must be a non-negative integer",
    )? {
        loader.set_overload_retry_limit(Some(limit));
    }

    Ok(())
}
