//! Integration tests for the relay client against a mock relay.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use tether_client::{Credentials, MessageId, PublishMessage, RelayClient, RetryPolicy};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        initial_delay: Duration::from_millis(10),
        factor: 2.0,
        max_delay: Duration::from_millis(40),
    }
}

fn client_for(server: &MockServer) -> RelayClient {
    RelayClient::new(server.uri(), Credentials::new("svc-agent", "secret"))
        .with_retry_policy(fast_retry())
}

fn grant(token: &str, expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "expires_in": expires_in,
    }))
}

fn ack(topic: &str, id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "message_id": id,
        "topic": topic,
        "timestamp": "2026-08-06T12:00:00Z",
    }))
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(grant("tok-1", 3600))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == endpoint)
        .collect()
}

#[tokio::test]
async fn publishes_with_bearer_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ack("job_status_update", "m-1"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ack = client
        .post_message("job_status_update", json!({"job_id": "j-1"}), None, None)
        .await
        .expect("publish");

    assert_eq!(ack.message_id, MessageId::from("m-1"));
    assert_eq!(ack.topic, "job_status_update");
}

#[tokio::test]
async fn caches_token_across_publishes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(grant("tok-1", 3600))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .respond_with(ack("t", "m"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .post_message("t", json!({"n": 1}), None, None)
        .await
        .expect("first publish");
    client
        .post_message("t", json!({"n": 2}), None, None)
        .await
        .expect("second publish");

    assert_eq!(requests_to(&server, "/auth/login").await.len(), 1);
}

#[tokio::test]
async fn reauthenticates_once_grant_enters_refresh_buffer() {
    let server = MockServer::start().await;
    let logins = Arc::new(AtomicUsize::new(0));
    let logins_clone = logins.clone();
    // expires_in far inside the 300s refresh buffer, so every call is stale.
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            let n = logins_clone.fetch_add(1, Ordering::SeqCst);
            grant(&format!("tok-{}", n + 1), 60)
        })
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .respond_with(ack("t", "m"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .post_message("t", json!({"n": 1}), None, None)
        .await
        .expect("first publish");
    client
        .post_message("t", json!({"n": 2}), None, None)
        .await
        .expect("second publish");

    assert_eq!(logins.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn retries_server_errors_until_success() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            if attempts_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ack("t", "m-3")
            }
        })
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ack = client
        .post_message("t", json!({}), None, None)
        .await
        .expect("publish after retries");

    assert_eq!(ack.message_id, MessageId::from("m-3"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_error_fails_fast_without_retry() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad topic"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .post_message("t", json!({}), None, None)
        .await
        .expect_err("400 must not be retried");

    assert!(error.is_client_error());
    assert_eq!(requests_to(&server, "/api/v1/messages").await.len(), 1);
}

#[tokio::test]
async fn unauthorized_invalidates_token_and_retries_once() {
    let server = MockServer::start().await;
    let logins = Arc::new(AtomicUsize::new(0));
    let logins_clone = logins.clone();
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            let n = logins_clone.fetch_add(1, Ordering::SeqCst);
            grant(&format!("tok-{}", n + 1), 3600)
        })
        .mount(&server)
        .await;
    // The first token is stale as far as the relay is concerned; only the
    // refreshed one is accepted.
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ack("t", "m-2"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ack = client
        .post_message("t", json!({}), None, None)
        .await
        .expect("publish after token refresh");

    assert_eq!(ack.message_id, MessageId::from("m-2"));
    assert_eq!(logins.load(Ordering::SeqCst), 2);
    assert_eq!(requests_to(&server, "/api/v1/messages").await.len(), 2);
}

#[tokio::test]
async fn repeated_unauthorized_is_terminal() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .post_message("t", json!({}), None, None)
        .await
        .expect_err("second 401 must surface");

    assert!(error.is_unauthorized());
    // One original attempt plus exactly one re-authenticated attempt.
    assert_eq!(requests_to(&server, "/api/v1/messages").await.len(), 2);
}

#[tokio::test]
async fn bulk_publish_reports_results_and_summary() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/messages/bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"topic": "a", "message_id": "m-1"},
                {"topic": "b", "error": "topic quota exceeded"},
            ],
            "summary": {"total": 2, "succeeded": 1, "failed": 1},
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .post_bulk_messages(vec![
            PublishMessage::new("a", json!({"n": 1})),
            PublishMessage::new("b", json!({"n": 2})),
        ])
        .await
        .expect("bulk publish");

    assert_eq!(response.summary.total, 2);
    assert_eq!(response.summary.succeeded, 1);
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].message_id, Some(MessageId::from("m-1")));
    assert!(response.results[1].error.is_some());
}

fn poll_batch(messages: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "messages": messages,
        "has_more": false,
    }))
}

#[tokio::test]
async fn long_poll_sends_cursors_only_for_requested_topics() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_clone = polls.clone();
    Mock::given(method("POST"))
        .and(path("/messages/poll"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            if polls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                poll_batch(json!([
                    {"topic": "a", "message_id": "a-1", "payload": {}},
                    {"topic": "b", "message_id": "b-1", "payload": {}},
                    {"topic": "a", "message_id": "a-2", "payload": {}},
                ]))
            } else {
                poll_batch(json!([]))
            }
        })
        .mount(&server)
        .await;

    let client = client_for(&server);
    let topics = vec!["a".to_string(), "b".to_string()];

    let first = client
        .long_poll(&topics, Duration::from_secs(1))
        .await
        .expect("first poll");
    assert_eq!(first.len(), 3);

    client
        .long_poll(&topics, Duration::from_secs(1))
        .await
        .expect("second poll");
    client
        .long_poll(&topics[..1], Duration::from_secs(1))
        .await
        .expect("third poll");

    let bodies: Vec<Value> = requests_to(&server, "/messages/poll")
        .await
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(bodies.len(), 3);

    // First poll had no cursors yet.
    assert!(bodies[0].get("since").is_none());
    // Second poll resumes both topics from the last observed id each.
    assert_eq!(bodies[1]["since"], json!({"a": "a-2", "b": "b-1"}));
    // Polling only one topic restricts the since map to it.
    assert_eq!(bodies[2]["since"], json!({"a": "a-2"}));
}

#[tokio::test]
async fn long_poll_empty_window_is_not_an_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/poll"))
        .respond_with(poll_batch(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = client
        .long_poll(&["a".to_string()], Duration::from_secs(1))
        .await
        .expect("empty poll");

    assert!(messages.is_empty());
    assert!(client.get_last_message_id("a").is_none());
}

#[tokio::test]
async fn long_poll_request_timeout_returns_empty() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    // Response arrives well past the window plus grace.
    Mock::given(method("POST"))
        .and(path("/messages/poll"))
        .respond_with(poll_batch(json!([])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = client_for(&server).with_poll_grace(Duration::from_millis(200));
    let messages = client
        .long_poll(&["a".to_string()], Duration::from_secs(1))
        .await
        .expect("timed-out poll");

    assert!(messages.is_empty());
}

#[tokio::test]
async fn long_poll_unauthorized_retries_once() {
    let server = MockServer::start().await;
    let logins = Arc::new(AtomicUsize::new(0));
    let logins_clone = logins.clone();
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(move |_req: &Request| -> ResponseTemplate {
            let n = logins_clone.fetch_add(1, Ordering::SeqCst);
            grant(&format!("tok-{}", n + 1), 3600)
        })
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages/poll"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages/poll"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(poll_batch(json!([
            {"topic": "a", "message_id": "a-1", "payload": {"job_id": "j-1"}},
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = client
        .long_poll(&["a".to_string()], Duration::from_secs(1))
        .await
        .expect("poll after token refresh");

    assert_eq!(messages.len(), 1);
    assert_eq!(logins.load(Ordering::SeqCst), 2);
    assert_eq!(client.get_last_message_id("a"), Some(MessageId::from("a-1")));
}

#[tokio::test]
async fn long_poll_server_error_propagates() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/messages/poll"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .long_poll(&["a".to_string()], Duration::from_secs(1))
        .await
        .expect_err("5xx on poll must surface");

    assert!(error.is_server_error());
}

#[tokio::test]
async fn cursor_accessors_manage_tracked_ids() {
    let client = RelayClient::new("http://localhost:8080", Credentials::new("svc", "secret"));

    assert!(client.get_last_message_id("a").is_none());

    client.set_last_message_id("a", MessageId::from("m-1"));
    client.set_last_message_id("b", MessageId::from("m-2"));
    assert_eq!(client.get_last_message_id("a"), Some(MessageId::from("m-1")));

    client.clear_tracked_message_ids(Some("a"));
    assert!(client.get_last_message_id("a").is_none());
    assert_eq!(client.get_last_message_id("b"), Some(MessageId::from("m-2")));

    client.clear_tracked_message_ids(None);
    assert!(client.get_last_message_id("b").is_none());
}
