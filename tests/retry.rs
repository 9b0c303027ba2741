use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest_resilient::{Backoff, CancellationToken, ClientBuilder, RetryConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

/// Responds with `status_code` for the first `failures` calls, then 200.
struct RetryResponder(Arc<AtomicU32>, u32, u16);

impl RetryResponder {
    fn new(failures: u32, status_code: u16) -> Self {
        Self(Arc::new(AtomicU32::new(0)), failures, status_code)
    }
}

impl Respond for RetryResponder {
    fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
        let calls = self.0.fetch_add(1, Ordering::SeqCst);
        if calls < self.1 {
            ResponseTemplate::new(self.2)
        } else {
            ResponseTemplate::new(200)
        }
    }
}

fn quick_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        backoff: Backoff::fixed(Duration::from_millis(10)),
        ..RetryConfig::default()
    }
}

#[tokio::test]
async fn retries_until_success_and_reports_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(RetryResponder::new(2, 503))
        .expect(3)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .with_retry(quick_retry(4))
        .build();

    let cancel = CancellationToken::new();
    let resp = client.get(&cancel, "/foo").await.expect("call failed");

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.retry_attempts(), 2);
}

#[tokio::test]
async fn exhausted_retries_return_the_last_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .with_retry(quick_retry(3))
        .build();

    let cancel = CancellationToken::new();
    let resp = client.get(&cancel, "/foo").await.expect("call failed");

    // The last failing status comes back as a successful call.
    assert_eq!(resp.status(), 500);
    assert_eq!(resp.retry_attempts(), 2);
}

#[tokio::test]
async fn non_retryable_status_gets_a_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .with_retry(quick_retry(4))
        .build();

    let cancel = CancellationToken::new();
    let resp = client.get(&cancel, "/foo").await.expect("call failed");

    assert_eq!(resp.status(), 404);
    assert_eq!(resp.retry_attempts(), 0);
}

#[tokio::test]
async fn no_retry_config_means_a_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .build();

    let cancel = CancellationToken::new();
    let resp = client.get(&cancel, "/foo").await.expect("call failed");

    assert_eq!(resp.status(), 500);
    assert_eq!(resp.retry_attempts(), 0);
}

#[tokio::test]
async fn post_body_is_replayed_on_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .with_retry(quick_retry(3))
        .build();

    let cancel = CancellationToken::new();
    let resp = client
        .post(&cancel, "/submit", r#"{"name":"test"}"#)
        .await
        .expect("call failed");
    assert_eq!(resp.status(), 502);
    assert_eq!(resp.retry_attempts(), 2);

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.body, br#"{"name":"test"}"#.to_vec());
    }
}

#[tokio::test]
async fn cancellation_during_backoff_aborts_promptly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .with_retry(RetryConfig {
            max_attempts: 4,
            backoff: Backoff::fixed(Duration::from_secs(30)),
            ..RetryConfig::default()
        })
        .build();

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
    }

    let started = Instant::now();
    let err = client.get(&cancel, "/foo").await.expect_err("call should abort");

    assert!(err.is_cancelled(), "unexpected error: {}", err);
    // Well before the 30s backoff would have elapsed.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn pre_cancelled_token_stops_before_any_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with_base_url(server.uri())
        .with_default_retry()
        .build();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client.get(&cancel, "/foo").await.expect_err("call should abort");
    assert!(err.is_cancelled());
}
