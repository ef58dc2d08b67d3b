//! Shared value types for the notifier domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the data a notification is built from: the workflow run, its jobs, their
//! conclusions and timings, and the message that is finally sent.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{JobId, RunId};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------

/// Time taken by a run or a job, as shown in the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elapsed {
    /// Both endpoints are known and in order.
    Span(Duration),
    /// The end precedes the start.
    Invalid,
    /// The job has not started or has not finished yet.
    Pending,
}

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Elapsed::Span(d) => {
                let secs = d.as_secs();
                write!(f, "{}m {}s", secs / 60, secs % 60)
            }
            Elapsed::Invalid => f.write_str("Invalid time"),
            Elapsed::Pending => f.write_str("in progress"),
        }
    }
}

// ---------------------------------------------------------------------------
// Conclusions
// ---------------------------------------------------------------------------

/// Final outcome GitHub assigns to a completed run or job.
///
/// Serialised as GitHub's snake_case strings. Values this crate does not know
/// about are preserved in [`Conclusion::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    Neutral,
    ActionRequired,
    Stale,
    StartupFailure,
    Other(String),
}

impl Conclusion {
    /// Maps a GitHub conclusion string onto a [`Conclusion`].
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            "skipped" => Self::Skipped,
            "timed_out" => Self::TimedOut,
            "neutral" => Self::Neutral,
            "action_required" => Self::ActionRequired,
            "stale" => Self::Stale,
            "startup_failure" => Self::StartupFailure,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns GitHub's string form of this conclusion.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::Neutral => "neutral",
            Self::ActionRequired => "action_required",
            Self::Stale => "stale",
            Self::StartupFailure => "startup_failure",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` if a job with this conclusion makes the whole run fail.
    pub fn is_failing(&self) -> bool {
        matches!(
            self,
            Self::Failure
                | Self::TimedOut
                | Self::Cancelled
                | Self::ActionRequired
                | Self::StartupFailure
        )
    }
}

impl From<String> for Conclusion {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Conclusion> for String {
    fn from(value: Conclusion) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the emoji shown next to a job with the given conclusion.
///
/// Jobs without a conclusion (still running) and conclusions outside the
/// known set get a question mark.
pub fn status_icon(conclusion: Option<&Conclusion>) -> &'static str {
    match conclusion {
        Some(Conclusion::Success) => "✅",
        Some(Conclusion::Failure) => "❌",
        Some(Conclusion::Cancelled) => "🚫",
        Some(Conclusion::Skipped) => "⏭️",
        Some(Conclusion::TimedOut) => "⏰",
        Some(Conclusion::Neutral) => "⚪",
        Some(Conclusion::ActionRequired) => "⚠️",
        _ => "❓",
    }
}

// ---------------------------------------------------------------------------
// Runs and jobs
// ---------------------------------------------------------------------------

/// Headline status of the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallStatus {
    Success,
    Failure,
}

impl OverallStatus {
    /// Returns the label used in the message body.
    pub fn label(self) -> &'static str {
        match self {
            OverallStatus::Success => "Success",
            OverallStatus::Failure => "Failure",
        }
    }
}

/// One execution of a GitHub Actions workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,

    /// Workflow name as displayed by GitHub.
    pub name: String,

    /// `None` while the run is still in progress, which is the normal case
    /// when the notifier runs as the final job of the same workflow.
    pub conclusion: Option<Conclusion>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkflowRun {
    /// Decides whether the notification reports success or failure.
    ///
    /// A concluded run reports `Success` only for a `success` conclusion.
    /// A run still in progress reports `Failure` if any of its jobs has
    /// already concluded with a failing outcome.
    pub fn overall_status(&self, jobs: &[Job]) -> OverallStatus {
        let failed = match &self.conclusion {
            Some(conclusion) => *conclusion != Conclusion::Success,
            None => jobs
                .iter()
                .filter_map(|job| job.conclusion.as_ref())
                .any(Conclusion::is_failing),
        };
        if failed {
            OverallStatus::Failure
        } else {
            OverallStatus::Success
        }
    }
}

/// A single job belonging to a [`WorkflowRun`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub conclusion: Option<Conclusion>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Markup dialect the receiving chat should use to render the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParseMode {
    /// Telegram's legacy `Markdown` mode.
    #[serde(rename = "Markdown")]
    Markdown,
}

impl ParseMode {
    /// Returns the Bot API name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// A rendered notification, ready to hand to a [`crate::MessageSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl OutgoingMessage {
    /// Creates a message rendered in legacy Markdown.
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Markdown,
        }
    }
}
