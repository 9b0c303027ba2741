use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use bytes::Bytes;
use http::{Method, StatusCode};
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::middleware::Middleware;
use crate::request::PendingRequest;
use crate::response::Response;
use crate::retry::RetryConfig;
use crate::transport::{ReqwestTransport, Transport, TransportResponse};

/// A `ClientBuilder` is used to build a [`Client`].
///
/// [`Client`]: crate::Client
pub struct ClientBuilder {
    client: reqwest::Client,
    base_url: Option<String>,
    middleware_stack: Vec<Arc<dyn Middleware>>,
    retry: Option<RetryConfig>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(client: reqwest::Client) -> Self {
        ClientBuilder {
            client,
            base_url: None,
            middleware_stack: Vec::new(),
            retry: None,
            transport: None,
        }
    }

    /// Sets a base URL that relative request paths are resolved against.
    /// Absolute `http://`/`https://` URLs bypass it. A trailing slash is
    /// trimmed.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_owned());
        self
    }

    /// Convenience method to attach middleware.
    ///
    /// If you need to keep a reference to the middleware after attaching, use [`with_arc`].
    ///
    /// [`with_arc`]: Self::with_arc
    pub fn with<M>(self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.with_arc(Arc::new(middleware))
    }

    /// Add middleware to the chain. [`with`] is more ergonomic if you don't need the `Arc`.
    ///
    /// [`with`]: Self::with
    pub fn with_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware_stack.push(middleware);
        self
    }

    /// Enables retries with the given configuration. The configuration is
    /// normalized (see [`RetryConfig::normalized`]) when the client is built.
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Enables retries with the default configuration.
    pub fn with_default_retry(self) -> Self {
        self.with_retry(RetryConfig::default())
    }

    /// Replaces the transport performing the physical exchanges. Defaults to
    /// [`ReqwestTransport`] over the builder's `reqwest::Client`.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Returns a `Client` using this builder configuration.
    pub fn build(self) -> Client {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.client)),
        };
        Client {
            transport,
            base_url: self.base_url,
            middleware_stack: self.middleware_stack.into_boxed_slice(),
            retry: self.retry.map(RetryConfig::normalized),
        }
    }
}

/// An HTTP client that runs a middleware chain on every physical attempt and
/// retries retryable outcomes with backoff.
///
/// A built `Client` is immutable and cheap to clone; it can serve many
/// concurrent logical calls, each of which runs its attempts sequentially.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Option<String>,
    middleware_stack: Box<[Arc<dyn Middleware>]>,
    retry: Option<RetryConfig>,
}

impl Client {
    /// Convenience method to make a `GET` request to a URL.
    pub async fn get(&self, cancel: &CancellationToken, url: &str) -> Result<Response> {
        self.execute(cancel, Method::GET, url, None).await
    }

    /// Convenience method to make a `POST` request to a URL. An empty body is
    /// sent as no body at all.
    pub async fn post<B: Into<Bytes>>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        body: B,
    ) -> Result<Response> {
        let body = body.into();
        let body = if body.is_empty() { None } else { Some(body) };
        self.execute(cancel, Method::POST, url, body).await
    }

    /// Convenience method to make a `PUT` request to a URL.
    pub async fn put<B: Into<Bytes>>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        body: B,
    ) -> Result<Response> {
        let body = body.into();
        let body = if body.is_empty() { None } else { Some(body) };
        self.execute(cancel, Method::PUT, url, body).await
    }

    /// Convenience method to make a `DELETE` request to a URL.
    pub async fn delete(&self, cancel: &CancellationToken, url: &str) -> Result<Response> {
        self.execute(cancel, Method::DELETE, url, None).await
    }

    /// Executes one logical call: one or more physical attempts, governed by
    /// the retry configuration and the caller's cancellation token.
    ///
    /// The body is buffered once up front and replayed byte-for-byte on every
    /// attempt. Each attempt rebuilds the request and runs the middleware
    /// chain before reaching the transport. A response whose status is not
    /// retryable is returned as success whatever the status code; attempt
    /// errors surface verbatim once retries are exhausted or the error does
    /// not match a retryable signature.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        method: Method,
        url: &str,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let started = Instant::now();
        let resolved = self.resolve_url(url);
        let target = Url::parse(&resolved).map_err(|err| {
            Error::Transport(anyhow!("invalid request URL '{}': {}", resolved, err))
        })?;

        let max_attempts = self.retry.as_ref().map_or(1, |config| config.max_attempts);

        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if attempt > 0 {
                self.wait_backoff(cancel, attempt).await?;
            }

            let outcome = self
                .attempt_once(cancel, &method, &target, body.as_ref())
                .await;

            match outcome {
                Ok(raw) if !self.retryable_status(raw.status) => {
                    return Ok(Response::from_parts(raw, attempt, started.elapsed()));
                }
                outcome => {
                    let wants_retry = match &outcome {
                        Ok(raw) => self.retryable_status(raw.status),
                        Err(err) => self.retryable_error(err),
                    };
                    if attempt + 1 < max_attempts && wants_retry {
                        attempt += 1;
                        continue;
                    }
                    // Exhausted, or the outcome is not retryable.
                    return match outcome {
                        Ok(raw) => Ok(Response::from_parts(
                            raw,
                            max_attempts - 1,
                            started.elapsed(),
                        )),
                        Err(err) => Err(err),
                    };
                }
            }
        }
    }

    async fn attempt_once(
        &self,
        cancel: &CancellationToken,
        method: &Method,
        url: &Url,
        body: Option<&Bytes>,
    ) -> Result<TransportResponse> {
        let mut req = PendingRequest::new(method.clone(), url.clone(), body.cloned());
        for middleware in self.middleware_stack.iter() {
            middleware.handle(&mut req).await?;
        }
        self.transport.exchange(req, cancel).await
    }

    /// Sleeps for the configured backoff, racing the cancellation token. The
    /// wait precedes attempt number `attempt` (always > 0 here).
    async fn wait_backoff(&self, cancel: &CancellationToken, attempt: u32) -> Result<()> {
        if let Some(config) = &self.retry {
            let delay = config.backoff.delay(attempt);
            tracing::warn!(
                "retry attempt #{}, sleeping {:?} before the next attempt",
                attempt,
                delay
            );
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            }
        }
        Ok(())
    }

    fn retryable_status(&self, status: StatusCode) -> bool {
        self.retry
            .as_ref()
            .map_or(false, |config| config.should_retry_status(status))
    }

    fn retryable_error(&self, err: &Error) -> bool {
        self.retry
            .as_ref()
            .map_or(false, |config| config.should_retry_error(err))
    }

    fn resolve_url(&self, url: &str) -> String {
        let base = match &self.base_url {
            Some(base) => base,
            None => return url.to_owned(),
        };
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_owned();
        }
        format!("{}/{}", base, url.trim_start_matches('/'))
    }
}

/// Create a `Client` without middleware, retries or a base URL.
impl From<reqwest::Client> for Client {
    fn from(client: reqwest::Client) -> Self {
        Client {
            transport: Arc::new(ReqwestTransport::new(client)),
            base_url: None,
            middleware_stack: Box::new([]),
            retry: None,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // skipping transport and middleware_stack fields
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
