//! Common test utilities for integration tests.
//!
//! Shared helpers and re-exports for testing the search client against a
//! `wiremock` server. Delays are kept to a few milliseconds so tests run on the
//! real clock.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//! - Clients built here use the `foo`/`bar` credentials

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use secrecy::SecretString;

#[allow(unused_imports)]
pub use sumo_client::testing::load_fixture;

#[allow(unused_imports)]
pub use sumo_client::{ClientError, SearchParams, SumoClient, SumoClientBuilder};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Job id used by the fixtures.
#[allow(dead_code)]
pub const JOB_ID: &str = "750D3ABE4460BA73";

/// `Basic` header for access id `foo` and access key `bar`.
#[allow(dead_code)]
pub const FOO_BAR_AUTH: &str = "Basic Zm9vOmJhcg==";

/// Builder pointed at the mock server with short delays.
#[allow(dead_code)]
pub fn test_builder(server: &MockServer) -> SumoClientBuilder {
    SumoClient::builder()
        .access_id("foo")
        .access_key(SecretString::new("bar".to_string().into()))
        .endpoint(server.uri())
        .retry_delay(Duration::from_millis(5))
        .polling_delay(Duration::from_millis(5))
        .timeout(Duration::from_secs(5))
}

#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> SumoClient {
    test_builder(server).build().expect("client should build")
}

#[allow(dead_code)]
pub fn ts(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp")
}

/// The query used by the fixtures, over a seven hour window.
#[allow(dead_code)]
pub fn sample_params() -> SearchParams {
    SearchParams::new(
        "sample_query",
        ts("2019-06-25T01:14:31Z"),
        ts("2019-06-25T08:14:31Z"),
    )
    .with_by_receipt_time(true)
}

/// Job state body with the given status and counts.
#[allow(dead_code)]
pub fn state_body(state: &str, message_count: u64, record_count: u64) -> serde_json::Value {
    serde_json::json!({
        "state": state,
        "histogramBuckets": [],
        "messageCount": message_count,
        "recordCount": record_count,
        "pendingWarnings": [],
        "pendingErrors": []
    })
}

/// Messages page with `n` items numbered from `start`.
#[allow(dead_code)]
pub fn messages_body(start: u64, n: u64) -> serde_json::Value {
    let messages: Vec<_> = (start..start + n)
        .map(|i| serde_json::json!({ "map": { "msg": format!("message{}", i + 1) } }))
        .collect();
    serde_json::json!({
        "fields": [{ "name": "msg", "fieldType": "string", "keyField": false }],
        "messages": messages
    })
}

/// Mount the job creation endpoint returning the fixture id.
#[allow(dead_code)]
pub async fn mount_create_job(server: &MockServer) {
    use wiremock::matchers::{method, path};

    Mock::given(method("POST"))
        .and(path("/search/jobs"))
        .respond_with(ResponseTemplate::new(202).set_body_json(load_fixture("search/create_job.json")))
        .mount(server)
        .await;
}

/// Mount the job deletion endpoint, expecting it to be called `times` times.
#[allow(dead_code)]
pub async fn mount_delete_job(server: &MockServer, times: u64) {
    use wiremock::matchers::{method, path};

    Mock::given(method("DELETE"))
        .and(path(format!("/search/jobs/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_fixture("search/delete_job.json")))
        .expect(times)
        .mount(server)
        .await;
}

/// Count requests received with the given method and path.
#[allow(dead_code)]
pub async fn count_requests(server: &MockServer, http_method: &str, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == url_path)
        .count()
}
