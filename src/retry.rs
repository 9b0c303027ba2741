use std::collections::HashSet;

use http::StatusCode;

use crate::backoff::Backoff;
use crate::error::Error;

/// Default attempt budget: one initial attempt plus three retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Status codes retried by default.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Error-message substrings retried by default.
pub const DEFAULT_RETRYABLE_ERROR_SIGNATURES: [&str; 4] = [
    "connection refused",
    "timeout",
    "temporary failure",
    "no such host",
];

/// Retry behavior for a [`Client`](crate::Client).
///
/// Build one with struct-update syntax over [`Default`] and hand it to
/// [`ClientBuilder::with_retry`](crate::ClientBuilder::with_retry); degenerate
/// fields (zero attempts, empty sets) are filled with the documented defaults
/// by [`normalized`](Self::normalized) when the client is built. Immutable
/// afterwards and safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempt budget, including the initial attempt. Zero means
    /// "use the default" ([`DEFAULT_MAX_ATTEMPTS`]).
    pub max_attempts: u32,
    /// Response status codes that warrant another attempt.
    pub retryable_status_codes: HashSet<u16>,
    /// Lowercase substrings matched against rendered attempt errors.
    pub retryable_error_signatures: HashSet<String>,
    /// Delay computation between attempts.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.iter().copied().collect(),
            retryable_error_signatures: DEFAULT_RETRYABLE_ERROR_SIGNATURES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    /// Fills degenerate fields with defaults and lowercases the error
    /// signatures. Pure; called once by `ClientBuilder::build`, but usable
    /// on its own.
    pub fn normalized(mut self) -> Self {
        if self.max_attempts == 0 {
            self.max_attempts = DEFAULT_MAX_ATTEMPTS;
        }
        if self.retryable_status_codes.is_empty() {
            self.retryable_status_codes =
                DEFAULT_RETRYABLE_STATUS_CODES.iter().copied().collect();
        }
        if self.retryable_error_signatures.is_empty() {
            self.retryable_error_signatures = DEFAULT_RETRYABLE_ERROR_SIGNATURES
                .iter()
                .map(|s| (*s).to_owned())
                .collect();
        } else {
            self.retryable_error_signatures = self
                .retryable_error_signatures
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect();
        }
        self
    }

    /// True iff the status code is in the configured retryable set.
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retryable_status_codes.contains(&status.as_u16())
    }

    /// True iff the error's rendered message (full cause chain, lowercased)
    /// contains any configured signature. Cancellation is never retried.
    pub fn should_retry_error(&self, err: &Error) -> bool {
        if err.is_cancelled() {
            return false;
        }
        let text = err.to_string().to_lowercase();
        self.retryable_error_signatures
            .iter()
            .any(|signature| text.contains(signature))
    }
}
