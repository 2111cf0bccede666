//! Error types for configuration loading.
//!
//! Invariants:
//! - All error variants include context for debugging (variable names, values).
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Access id is required. Set SUMO_ACCESS_ID or pass --access-id.")]
    MissingAccessId,

    #[error("Access key is required. Set SUMO_ACCESS_KEY or pass --access-key.")]
    MissingAccessKey,

    #[error("Endpoint is required. Set SUMO_ENDPOINT or pass --endpoint.")]
    MissingEndpoint,

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    #[error("Unknown timezone '{0}' (expected an IANA name such as Asia/Tokyo)")]
    InvalidTimezone(String),

    #[error("invalid retry count: {message}")]
    InvalidRetryCount { message: String },

    #[error("invalid page limit: {message}")]
    InvalidPageLimit { message: String },

    #[error("invalid timeout: {message}")]
    InvalidTimeout { message: String },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
