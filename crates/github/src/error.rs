use std::time::Duration;

use report::{HasRetryPolicy, RetryPolicy};
use thiserror::Error;

/// Errors reported by [`crate::GithubClient`].
#[derive(Debug, Error)]
pub enum GithubError {
    /// The request never produced a response (DNS, TLS, timeout, reset).
    #[error("GitHub request failed")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub API returned {status}: {message}")]
    Status {
        status: u16,
        /// `message` field of GitHub's error body, or the raw body.
        message: String,
        /// Delay requested by `retry-after` or implied by `x-ratelimit-reset`.
        retry_after: Option<Duration>,
        /// `x-ratelimit-remaining` was `0`, or `retry-after` was sent
        /// (secondary rate limit).
        rate_limited: bool,
    },

    /// The response body did not match the expected schema.
    #[error("Unexpected GitHub response")]
    Decode(#[from] serde_json::Error),
}

impl HasRetryPolicy for GithubError {
    fn retry_policy(&self) -> RetryPolicy {
        match self {
            GithubError::Http(e) if e.is_timeout() || e.is_connect() => {
                RetryPolicy::Retryable { after: None }
            }
            GithubError::Status {
                status,
                retry_after,
                rate_limited,
                ..
            } if *status == 429 || *status >= 500 || (*status == 403 && *rate_limited) => {
                RetryPolicy::Retryable {
                    after: *retry_after,
                }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}
