use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// There was an error running some middleware
    #[error("middleware error: {0:#}")]
    Middleware(#[from] anyhow::Error),
    /// The transport failed to complete the exchange
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),
    /// The caller's cancellation token fired before the call could finish
    #[error("call cancelled")]
    Cancelled,
    /// The response body could not be decoded
    #[cfg(feature = "json")]
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub fn middleware<E>(err: E) -> Self
    where
        E: 'static + Send + Sync + std::error::Error,
    {
        Error::Middleware(err.into())
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: 'static + Send + Sync + std::error::Error,
    {
        Error::Transport(err.into())
    }

    /// Returns true if the error came from a middleware abort.
    pub fn is_middleware(&self) -> bool {
        matches!(self, Error::Middleware(_))
    }

    /// Returns true if the error came from the transport exchange.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns true if the call was aborted by the caller's cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.into())
    }
}
