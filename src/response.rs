use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::transport::TransportResponse;

/// The aggregated result of one logical call, spanning every attempt the
/// client made for it.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    retry_attempts: u32,
    total_duration: Duration,
}

impl Response {
    pub(crate) fn from_parts(
        raw: TransportResponse,
        retry_attempts: u32,
        total_duration: Duration,
    ) -> Self {
        Response {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            retry_attempts,
            total_duration,
        }
    }

    /// The status code of the final attempt.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The headers of the final attempt.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The buffered response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    #[cfg(feature = "json")]
    #[cfg_attr(docsrs, doc(cfg(feature = "json")))]
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_slice(&self.body).map_err(crate::Error::from)
    }

    /// How many retries were performed beyond the initial attempt. Zero when
    /// the first attempt succeeded or was terminal.
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// Elapsed wall-clock time for the whole logical call, backoff waits
    /// included.
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }
}
