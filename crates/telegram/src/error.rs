use std::time::Duration;

use report::{HasRetryPolicy, RetryPolicy};
use thiserror::Error;

/// Errors reported by [`crate::TelegramClient`].
///
/// The bot token is part of every request URL, so transport errors are
/// stored with their URL stripped.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The request never produced a response.
    #[error("Telegram request failed")]
    Http(#[source] reqwest::Error),

    /// `sendMessage` timed out after the request was sent. Telegram may
    /// still have delivered it, so this is never retried.
    #[error("Telegram did not confirm the message in time")]
    Unconfirmed(#[source] reqwest::Error),

    /// The Bot API rejected the request (`"ok": false` or a non-2xx status).
    #[error("Telegram API returned {status}: {description}")]
    Api {
        status: u16,
        description: String,
        /// `parameters.retry_after` from a flood-control response.
        retry_after: Option<Duration>,
    },

    /// The response body did not match the Bot API envelope.
    #[error("Unexpected Telegram response")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Http(err.without_url())
    }
}

impl HasRetryPolicy for TelegramError {
    fn retry_policy(&self) -> RetryPolicy {
        match self {
            TelegramError::Http(e) if e.is_timeout() || e.is_connect() => {
                RetryPolicy::Retryable { after: None }
            }
            TelegramError::Api {
                status,
                retry_after,
                ..
            } if *status == 429 || *status >= 500 => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl TelegramError {
    // Connect failures never reached Telegram; anything else that timed out
    // might have.
    pub(crate) fn into_unconfirmed_on_timeout(self) -> Self {
        match self {
            TelegramError::Http(e) if e.is_timeout() && !e.is_connect() => {
                TelegramError::Unconfirmed(e)
            }
            other => other,
        }
    }
}
