//! Centralized constants for the Sumo search workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Retry Defaults
// =============================================================================

/// Default delay between retry attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Default number of retries for transport failures and 500/503 responses.
pub const DEFAULT_RETRY_COUNT: usize = 3;

/// Maximum allowed retry count.
pub const MAX_RETRY_COUNT: usize = 10;

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

// =============================================================================
// Search & Polling Defaults
// =============================================================================

/// Default timezone used to qualify search time ranges.
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// Default delay between job state polls in milliseconds.
pub const DEFAULT_POLLING_DELAY_MS: u64 = 1000;

/// Default number of messages or records requested per results page.
pub const DEFAULT_PAGE_LIMIT: u64 = 50_000;

/// Largest page the search job API will serve.
pub const MAX_PAGE_LIMIT: u64 = 50_000;

// =============================================================================
// Deployment Endpoints
// =============================================================================

/// API endpoint of the Japan deployment.
pub const ENDPOINT_JP: &str = "https://api.jp.sumologic.com/api/v1/";

/// Known deployments and their API endpoints, keyed by short name.
pub const DEPLOYMENT_ENDPOINTS: &[(&str, &str)] = &[
    ("us1", "https://api.sumologic.com/api/v1/"),
    ("us2", "https://api.us2.sumologic.com/api/v1/"),
    ("eu", "https://api.eu.sumologic.com/api/v1/"),
    ("au", "https://api.au.sumologic.com/api/v1/"),
    ("de", "https://api.de.sumologic.com/api/v1/"),
    ("ca", "https://api.ca.sumologic.com/api/v1/"),
    ("in", "https://api.in.sumologic.com/api/v1/"),
    ("fed", "https://api.fed.sumologic.com/api/v1/"),
    ("jp", ENDPOINT_JP),
];

/// Resolve a deployment short name (case-insensitive) to its API endpoint.
pub fn deployment_endpoint(name: &str) -> Option<&'static str> {
    DEPLOYMENT_ENDPOINTS
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(name.trim()))
        .map(|(_, endpoint)| *endpoint)
}
