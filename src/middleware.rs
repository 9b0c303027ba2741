use crate::error::Result;
use crate::request::PendingRequest;

/// When attached to a [`Client`] (generally using [`with`]), middleware runs
/// against every physical attempt the client makes, in the order it was
/// attached.
///
/// A middleware may mutate the request (headers, URL, body) or abort the
/// attempt by returning an error. Because the chain re-runs against a freshly
/// rebuilt request on every retry, side effects such as signing or timestamp
/// headers are recomputed per attempt and must be idempotent.
///
/// # Example
///
/// ```
/// use reqwest_resilient::{Middleware, PendingRequest, Result};
///
/// struct UserAgentMiddleware;
///
/// #[async_trait::async_trait]
/// impl Middleware for UserAgentMiddleware {
///     async fn handle(&self, req: &mut PendingRequest) -> Result<()> {
///         req.headers_mut()
///             .insert("user-agent", "my-service/1.0".parse().unwrap());
///         Ok(())
///     }
/// }
/// ```
///
/// [`Client`]: crate::Client
/// [`with`]: crate::ClientBuilder::with
#[async_trait::async_trait]
pub trait Middleware: 'static + Send + Sync {
    /// Invoked with the attempt's request before it reaches the transport.
    /// Returning an error aborts the attempt and short-circuits the rest of
    /// the chain.
    async fn handle(&self, req: &mut PendingRequest) -> Result<()>;
}

#[async_trait::async_trait]
impl<F> Middleware for F
where
    F: Send + Sync + 'static + Fn(&mut PendingRequest) -> Result<()>,
{
    async fn handle(&self, req: &mut PendingRequest) -> Result<()> {
        (self)(req)
    }
}
