use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::request::PendingRequest;

/// The outcome of one physical HTTP exchange.
#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Performs one HTTP exchange for a fully-formed request.
///
/// The default implementation is [`ReqwestTransport`]; tests and callers with
/// unusual transports can plug their own in via
/// [`ClientBuilder::with_transport`](crate::ClientBuilder::with_transport).
/// Implementations must observe the cancellation token and return
/// [`Error::Cancelled`] promptly once it fires.
#[async_trait::async_trait]
pub trait Transport: 'static + Send + Sync {
    async fn exchange(
        &self,
        req: PendingRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
///
/// The exchange (send plus body read) races against the cancellation token;
/// connection pooling, TLS and timeouts stay with the underlying client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn exchange(
        &self,
        req: PendingRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        let (method, url, headers, body) = req.into_parts();
        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let roundtrip = async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        };

        tokio::select! {
            outcome = roundtrip => outcome,
            _ = cancel.cancelled() => Err(Error::Cancelled),
        }
    }
}
