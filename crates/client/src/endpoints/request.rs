//! Transport retrier for search API requests.
//!
//! Issues one logical request, retrying according to the service's error
//! semantics:
//! - Transport failure (no response): retried up to `retry_count` times, then
//!   surfaced unchanged as [`ClientError::HttpError`].
//! - 429 / 504: transient overload. Retried without consuming the retry budget;
//!   indefinitely unless `overload_retry_limit` is set.
//! - 500 / 503: retried against the same budget as transport failures, then
//!   [`ClientError::MaxRetriesExceeded`].
//! - Any other status >= 400: [`ClientError::ApiError`] on first occurrence.
//!
//! Waits between attempts are a fixed `retry_delay`; there is no backoff growth
//! and no jitter.
//!
//! # What this module does NOT handle:
//! - Interpreting successful bodies (see [`crate::endpoints::search`])
//! - Cancellation; a request in flight always runs to completion

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::BasicCredentials;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Retry settings applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed wait between attempts.
    pub retry_delay: Duration,
    /// Budget shared by transport failures and 500/503 responses.
    pub retry_count: usize,
    /// Ceiling on consecutive 429/504 retries. `None` retries indefinitely.
    pub overload_retry_limit: Option<usize>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(sumo_config::constants::DEFAULT_RETRY_DELAY_MS),
            retry_count: sumo_config::constants::DEFAULT_RETRY_COUNT,
            overload_retry_limit: None,
        }
    }
}

/// Description of one logical API request. Rebuilt into a fresh
/// `reqwest::Request` for every attempt.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Route template used as the metrics `endpoint` label, e.g.
    /// `/search/jobs/{id}`. Never contains job ids.
    pub route: &'static str,
    /// Path relative to the endpoint, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, route: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            route,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(route: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::GET, route, path)
    }

    pub fn post(route: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::POST, route, path)
    }

    pub fn delete(route: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, route, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: reqwest::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Error body shape returned by the service for failed requests.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Sends `request`, applying the retry policy described in the module docs.
///
/// Always sends `Content-Type: application/json` and the Basic `Authorization`
/// header. The body, when present, is serialized as JSON text.
///
/// # Errors
/// - [`ClientError::HttpError`] after `retry_count + 1` attempts without a response
/// - [`ClientError::MaxRetriesExceeded`] after `retry_count + 1` consecutive 500/503 responses
/// - [`ClientError::OverloadRetriesExceeded`] when an overload ceiling is set and reached
/// - [`ClientError::ApiError`] for any other status >= 400
pub async fn send_request_with_retry(
    http: &Client,
    base_url: &str,
    credentials: &BasicCredentials,
    request: &ApiRequest,
    policy: &RetryPolicy,
    metrics: Option<&MetricsCollector>,
) -> Result<Response> {
    let url = format!("{}{}", base_url, request.path);
    let method = request.method.as_str();
    let endpoint = request.route;

    let mut remaining_retries = policy.retry_count;
    let mut overload_retries = 0usize;
    let mut attempt = 0usize;

    loop {
        attempt += 1;
        let builder = build_attempt(http, &url, credentials, request)?;

        debug!(method, url = %url, attempt, "Sending request");
        if let Some(m) = metrics {
            m.record_request(endpoint, method);
        }

        let started = Instant::now();
        let result = builder.send().await;
        let elapsed = started.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if let Some(m) = metrics {
                    m.record_request_duration(endpoint, method, elapsed, None);
                }
                if remaining_retries > 0 {
                    remaining_retries -= 1;
                    overload_retries = 0;
                    warn!(
                        method,
                        url = %url,
                        attempt,
                        remaining_retries,
                        error = %e,
                        "Request failed without a response, retrying"
                    );
                    if let Some(m) = metrics {
                        m.record_retry(endpoint, method, "transport");
                    }
                    tokio::time::sleep(policy.retry_delay).await;
                    continue;
                }
                let err = ClientError::HttpError(e);
                if let Some(m) = metrics {
                    m.record_client_error(endpoint, method, &err);
                }
                return Err(err);
            }
        };

        let status = response.status().as_u16();
        if let Some(m) = metrics {
            m.record_request_duration(endpoint, method, elapsed, Some(status));
        }

        if ClientError::is_overload_status(status) {
            if let Some(limit) = policy.overload_retry_limit
                && overload_retries >= limit
            {
                let err = ClientError::OverloadRetriesExceeded {
                    status,
                    attempts: attempt,
                };
                if let Some(m) = metrics {
                    m.record_client_error(endpoint, method, &err);
                }
                return Err(err);
            }
            overload_retries += 1;
            debug!(
                method,
                url = %url,
                status,
                attempt,
                "Service overloaded, retrying without consuming retry budget"
            );
            if let Some(m) = metrics {
                m.record_retry(endpoint, method, &status.to_string());
            }
            tokio::time::sleep(policy.retry_delay).await;
            continue;
        }

        if ClientError::is_retryable_status(status) {
            if remaining_retries > 0 {
                remaining_retries -= 1;
                overload_retries = 0;
                warn!(
                    method,
                    url = %url,
                    status,
                    attempt,
                    remaining_retries,
                    "Server error, retrying"
                );
                if let Some(m) = metrics {
                    m.record_retry(endpoint, method, &status.to_string());
                }
                tokio::time::sleep(policy.retry_delay).await;
                continue;
            }
            let err = ClientError::MaxRetriesExceeded {
                status,
                attempts: attempt,
            };
            if let Some(m) = metrics {
                m.record_client_error(endpoint, method, &err);
            }
            return Err(err);
        }

        if status >= 400 {
            let err = api_error_from_response(response).await;
            debug!(method, url = %url, status, "Request failed with non-retryable status");
            if let Some(m) = metrics {
                m.record_client_error(endpoint, method, &err);
            }
            return Err(err);
        }

        if attempt > 1 {
            debug!(method, url = %url, attempt, "Request succeeded after retry");
        }
        return Ok(response);
    }
}

fn build_attempt(
    http: &Client,
    url: &str,
    credentials: &BasicCredentials,
    request: &ApiRequest,
) -> Result<reqwest::RequestBuilder> {
    let mut auth = HeaderValue::from_str(credentials.authorization_header().expose_secret())
        .map_err(|_| ClientError::InvalidResponse("credentials contain invalid header characters".to_string()))?;
    auth.set_sensitive(true);

    let mut builder = http
        .request(request.method.clone(), url)
        .headers(request.headers.clone())
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .header(AUTHORIZATION, auth);

    if !request.query.is_empty() {
        builder = builder.query(&request.query);
    }
    if let Some(body) = &request.body {
        let text = serde_json::to_string(body)
            .map_err(|e| ClientError::InvalidResponse(format!("unserializable request body: {e}")))?;
        builder = builder.body(text);
    }

    Ok(builder)
}

async fn api_error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());

    let parsed = serde_json::from_str::<ServiceErrorBody>(&body).ok();
    let code = parsed.as_ref().and_then(|p| p.code.clone());
    let message = parsed
        .and_then(|p| p.message)
        .unwrap_or_else(|| body.clone());

    ClientError::ApiError {
        status,
        url,
        code,
        message,
        body,
        headers,
    }
}
