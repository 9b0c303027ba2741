use bytes::Bytes;
use http::{HeaderMap, Method};
use reqwest::Url;

/// The in-flight representation of one physical attempt.
///
/// A fresh `PendingRequest` is built from the call's buffered body for every
/// attempt, so middleware mutations never leak from one attempt into the
/// next.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl PendingRequest {
    pub(crate) fn new(method: Method, url: Url, body: Option<Bytes>) -> Self {
        PendingRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get a mutable reference to the method.
    pub fn method_mut(&mut self) -> &mut Method {
        &mut self.method
    }

    /// Get the url.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get a mutable reference to the url.
    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Get the body, if one was supplied.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Replace the body.
    pub fn set_body<B: Into<Bytes>>(&mut self, body: B) {
        self.body = Some(body.into());
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderMap, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}
