//! Transport retrier behavior.
//!
//! # Invariants
//! - Requests without a response are attempted `retry_count + 1` times
//! - 429/504 are retried regardless of `retry_count`
//! - 500/503 are retried `retry_count` times, then "Exceeded retry count"
//! - Other statuses >= 400 fail on the first attempt

mod common;

use common::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use sumo_client::endpoints::{ApiRequest, RetryPolicy, send_request_with_retry};
use sumo_client::BasicCredentials;
use secrecy::SecretString;
use wiremock::matchers::{header, method, path};

fn state_path() -> String {
    format!("/search/jobs/{JOB_ID}")
}

async fn mount_done_state(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/job_state_done.json")),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Accepts connections and closes them without answering.
async fn spawn_hangup_server() -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let accepted = Arc::new(AtomicUsize::new(0));

    tokio::spawn({
        let accepted = accepted.clone();
        async move {
            while let Ok((socket, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        }
    });

    (format!("http://{addr}"), accepted)
}

#[tokio::test]
async fn test_transport_failure_attempts_retry_count_plus_one() {
    let (endpoint, accepted) = spawn_hangup_server().await;

    let client = SumoClient::builder()
        .access_id("foo")
        .access_key(SecretString::new("bar".to_string().into()))
        .endpoint(endpoint)
        .retry_count(2)
        .retry_delay(Duration::from_millis(5))
        .build()
        .unwrap();

    let err = client.job_state(JOB_ID).await.unwrap_err();

    assert!(matches!(err, ClientError::HttpError(_)), "got {err:?}");
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_transport_failure_without_budget_fails_immediately() {
    let (endpoint, accepted) = spawn_hangup_server().await;

    let client = SumoClient::builder()
        .access_id("foo")
        .access_key(SecretString::new("bar".to_string().into()))
        .endpoint(endpoint)
        .retry_count(0)
        .build()
        .unwrap();

    let err = client.delete_job(JOB_ID).await.unwrap_err();

    assert!(matches!(err, ClientError::HttpError(_)));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rate_limit_is_retried_beyond_retry_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(5)
        .expect(5)
        .mount(&server)
        .await;
    mount_done_state(&server, 1).await;

    let client = test_builder(&server).retry_count(1).build().unwrap();
    let state = client.job_state(JOB_ID).await.expect("overload should resolve");

    assert_eq!(state.message_count, 3);
}

#[tokio::test]
async fn test_gateway_timeout_is_retried_beyond_retry_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(4)
        .expect(4)
        .mount(&server)
        .await;
    mount_done_state(&server, 1).await;

    let client = test_builder(&server).retry_count(0).build().unwrap();
    assert!(client.job_state(JOB_ID).await.is_ok());
}

#[tokio::test]
async fn test_overload_does_not_consume_retry_budget() {
    let server = MockServer::start().await;

    // 503, 429, 429, 503, then success: two budgeted retries, two free ones.
    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_done_state(&server, 1).await;

    let client = test_builder(&server).retry_count(2).build().unwrap();
    assert!(client.job_state(JOB_ID).await.is_ok());
    assert_eq!(count_requests(&server, "GET", &state_path()).await, 5);
}

#[tokio::test]
async fn test_overload_ceiling_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_builder(&server)
        .overload_retry_limit(Some(2))
        .build()
        .unwrap();
    let err = client.job_state(JOB_ID).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::OverloadRetriesExceeded {
            status: 429,
            attempts: 3
        }
    ));
}

#[tokio::test]
async fn test_service_unavailable_recovers_within_budget() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    mount_done_state(&server, 1).await;

    let client = test_builder(&server).retry_count(3).build().unwrap();
    assert!(client.job_state(JOB_ID).await.is_ok());
}

#[tokio::test]
async fn test_internal_error_exceeds_retry_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(4)
        .expect(4)
        .mount(&server)
        .await;
    mount_done_state(&server, 0).await;

    let client = test_builder(&server).retry_count(3).build().unwrap();
    let err = client.job_state(JOB_ID).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::MaxRetriesExceeded {
            status: 500,
            attempts: 4
        }
    ));
    assert!(err.to_string().contains("Exceeded retry count"));
}

#[tokio::test]
async fn test_service_unavailable_exceeds_retry_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_builder(&server).retry_count(1).build().unwrap();
    let err = client.job_state(JOB_ID).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::MaxRetriesExceeded {
            status: 503,
            attempts: 2
        }
    ));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    for status in [400u16, 401, 403, 404, 405, 409, 422, 501, 502] {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(state_path()))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.job_state(JOB_ID).await.unwrap_err();

        match err {
            ClientError::ApiError {
                status: got,
                ref body,
                ..
            } => {
                assert_eq!(got, status);
                assert_eq!(body, "nope");
            }
            other => panic!("expected ApiError for {status}, got {other:?}"),
        }
        server.verify().await;
    }
}

#[tokio::test]
async fn test_api_error_carries_service_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search/jobs"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-request-id", "abc123")
                .set_body_json(load_fixture("search/error_invalid_timestamp.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.submit_search(&sample_params()).await.unwrap_err();

    match err {
        ClientError::ApiError {
            status,
            code,
            message,
            headers,
            body,
            ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("searchjob.invalid.timestamp.from"));
            assert_eq!(message, "The 'from' field contains an invalid time.");
            assert_eq!(headers.get("x-request-id").unwrap(), "abc123");
            assert!(body.contains("IUUQI-DGH5I-TJ045"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_every_attempt_sends_json_content_type_and_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(state_path()))
        .and(header("content-type", "application/json"))
        .and(header("authorization", FOO_BAR_AUTH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(state_path()))
        .and(header("content-type", "application/json"))
        .and(header("authorization", FOO_BAR_AUTH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("search/job_state_done.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.job_state(JOB_ID).await.is_ok());
}

#[tokio::test]
async fn test_send_request_with_retry_directly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(504))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let credentials = BasicCredentials::new("foo", SecretString::new("bar".to_string().into()));
    let request = ApiRequest::post("/echo", "/echo").json(serde_json::json!({ "hello": "world" }));
    let policy = RetryPolicy {
        retry_delay: Duration::from_millis(1),
        retry_count: 0,
        overload_retry_limit: None,
    };

    let response = send_request_with_retry(&http, &server.uri(), &credentials, &request, &policy, None)
        .await
        .expect("request should succeed after overload");
    assert_eq!(response.text().await.unwrap(), "ok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["hello"], "world");
    }
}
