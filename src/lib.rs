//! This crate provides [`Client`], a wrapper around [`reqwest::Client`] that
//! runs an ordered middleware chain on every request and retries retryable
//! outcomes with configurable backoff.
//!
//! You'll want to instantiate [`Client`] using [`ClientBuilder`]: attach
//! middleware with [`with`], enable retries with [`with_retry`], finalize it
//! with [`build`], and from then on each call takes a
//! [`CancellationToken`] that aborts the whole call, backoff waits included:
//!
//! ```
//! use reqwest_resilient::{
//!     Backoff, CancellationToken, ClientBuilder, PendingRequest, Result, RetryConfig,
//! };
//! use std::time::Duration;
//!
//! fn request_id(req: &mut PendingRequest) -> Result<()> {
//!     req.headers_mut()
//!         .insert("x-request-id", "abc-123".parse().unwrap());
//!     Ok(())
//! }
//!
//! async fn run() {
//!     let reqwest_client = reqwest::Client::builder().build().unwrap();
//!     let client = ClientBuilder::new(reqwest_client)
//!         .with_base_url("https://api.example.com")
//!         .with(request_id)
//!         .with_retry(RetryConfig {
//!             max_attempts: 3,
//!             backoff: Backoff::exponential(
//!                 Duration::from_millis(100),
//!                 2.0,
//!                 Duration::from_secs(5),
//!             )
//!             .with_jitter(),
//!             ..RetryConfig::default()
//!         })
//!         .build();
//!
//!     let cancel = CancellationToken::new();
//!     let resp = client.get(&cancel, "/users").await.unwrap();
//!     println!("{} after {} retries", resp.status(), resp.retry_attempts());
//! }
//! ```
//!
//! [`build`]: ClientBuilder::build
//! [`with`]: ClientBuilder::with
//! [`with_retry`]: ClientBuilder::with_retry
mod backoff;
mod client;
mod error;
mod middleware;
mod request;
mod response;
mod retry;
mod transport;

pub use backoff::{
    Backoff, DEFAULT_EXPONENTIAL_BASE_DELAY, DEFAULT_EXPONENTIAL_MAX_DELAY,
    DEFAULT_EXPONENTIAL_MULTIPLIER, DEFAULT_FIXED_DELAY,
};
pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use middleware::Middleware;
pub use request::PendingRequest;
pub use response::Response;
pub use retry::{
    RetryConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRYABLE_ERROR_SIGNATURES,
    DEFAULT_RETRYABLE_STATUS_CODES,
};
pub use transport::{ReqwestTransport, Transport, TransportResponse};

pub use tokio_util::sync::CancellationToken;
