//! Shared test utilities for sumo-cli integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Mount the job endpoints a complete search needs on a `wiremock` server.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Credentials are `foo`/`bar`; retry and polling delays are 5ms.

use assert_cmd::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(unused_imports)]
pub use sumo_client::testing::load_fixture;

/// Job id used by the fixtures.
#[allow(dead_code)]
pub const JOB_ID: &str = "750D3ABE4460BA73";

/// Every variable the CLI reads configuration from.
pub const SUMO_VARS: &[&str] = &[
    "SUMO_ACCESS_ID",
    "SUMO_ACCESS_KEY",
    "SUMO_ENDPOINT",
    "SUMO_TIMEZONE",
    "SUMO_RETRY_DELAY_MS",
    "SUMO_RETRY_COUNT",
    "SUMO_POLLING_DELAY_MS",
    "SUMO_PAGE_LIMIT",
    "SUMO_TIMEOUT",
    "SUMO_OVERLOAD_RETRY_LIMIT",
];

/// Returns a hermetic `sumo-cli` command without any configuration.
///
/// - `DOTENV_DISABLED=1` prevents local `.env` contamination.
/// - Every `SUMO_*` variable from the host is cleared.
#[allow(dead_code)]
pub fn bare_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sumo-cli");
    cmd.env("DOTENV_DISABLED", "1");
    for var in SUMO_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Returns a hermetic `sumo-cli` command with credentials and short delays.
#[allow(dead_code)]
pub fn sumo_cmd() -> Command {
    let mut cmd = bare_cmd();
    cmd.env("SUMO_ACCESS_ID", "foo")
        .env("SUMO_ACCESS_KEY", "bar")
        .env("SUMO_RETRY_DELAY_MS", "5")
        .env("SUMO_POLLING_DELAY_MS", "5")
        .env("SUMO_TIMEOUT", "5");
    cmd
}

/// Returns `sumo_cmd()` pointed at `endpoint`.
#[allow(dead_code)]
pub fn sumo_cmd_with_endpoint(endpoint: &str) -> Command {
    let mut cmd = sumo_cmd();
    cmd.env("SUMO_ENDPOINT", endpoint);
    cmd
}

/// Mount job creation, a single done state, one results page and deletion.
#[allow(dead_code)]
pub async fn mount_completed_job(
    server: &MockServer,
    state: serde_json::Value,
    results_path: &str,
    page: serde_json::Value,
) {
    Mock::given(method("POST"))
        .and(path("/search/jobs"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(load_fixture("search/create_job.json")),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/search/jobs/{JOB_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(state))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/search/jobs/{JOB_ID}/{results_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .mount(server)
        .await;

    mount_delete(server).await;
}

#[allow(dead_code)]
pub async fn mount_delete(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path(format!("/search/jobs/{JOB_ID}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/delete_job.json")),
        )
        .mount(server)
        .await;
}

/// Number of requests the server received with the given method and path.
#[allow(dead_code)]
pub async fn count_requests(server: &MockServer, http_method: &str, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
        .count()
}

/// Standard `search` arguments over a seven hour window.
#[allow(dead_code)]
pub fn search_args(query: &str) -> Vec<String> {
    vec![
        "search".to_string(),
        query.to_string(),
        "--from".to_string(),
        "2019-06-25T10:14:31+09:00".to_string(),
        "--to".to_string(),
        "2019-06-25T17:14:31+09:00".to_string(),
    ]
}
