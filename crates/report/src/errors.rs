//! Top-level error and retry-policy types for the notifier.
//!
//! [`NotifyError`] covers conditions that stop a notification from being
//! produced or delivered. Transport-level errors (GitHub and Telegram API
//! failures) are defined in their respective infrastructure crates and are
//! carried inside [`NotifyError::Stage`] as the error source.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions implements [`HasRetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error used to carry an infrastructure failure across crate boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by infrastructure error types to let the dispatcher decide
/// whether to re-invoke an operation or give up.
///
/// - `Retryable` errors: timeouts, connection failures, rate limiting, 5xx.
/// - `NonRetryable` errors: bad credentials, unknown run or chat, malformed
///   responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from `Retry-After`, `x-ratelimit-reset`, or Telegram's
    /// `parameters.retry_after`).
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

/// Implemented by infrastructure errors so the dispatcher can classify them.
pub trait HasRetryPolicy {
    /// Returns whether the failed operation may be attempted again.
    fn retry_policy(&self) -> RetryPolicy;
}

// ---------------------------------------------------------------------------
// Notifier-level errors
// ---------------------------------------------------------------------------

/// The step of a notification run at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    TelegramConnection,
    GithubAccess,
    FetchRun,
    FetchJobs,
    SendMessage,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Stage::TelegramConnection => "Telegram connection check",
            Stage::GithubAccess => "GitHub API access check",
            Stage::FetchRun => "Fetching workflow run",
            Stage::FetchJobs => "Fetching workflow jobs",
            Stage::SendMessage => "Sending Telegram message",
        };
        f.write_str(text)
    }
}

/// Errors that end a notification run.
///
/// Every variant maps to process exit status 1 in the CLI.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The runtime configuration is missing or invalid.
    ///
    /// Produced at load time; no network call is made with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An external call failed after exhausting its retry budget, or with a
    /// non-retryable error.
    #[error("{stage} failed")]
    Stage {
        /// Which step of the run failed.
        stage: Stage,
        /// The infrastructure error reported by the adapter.
        #[source]
        source: BoxError,
    },
}

impl NotifyError {
    /// Creates a [`NotifyError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps an infrastructure error raised during `stage`.
    pub fn at_stage<E>(stage: Stage, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }

    /// Returns the stage that failed, if this error came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::Configuration { .. } => None,
        }
    }
}
