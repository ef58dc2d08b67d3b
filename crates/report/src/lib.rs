//! Core domain for the workflow notifier.
//!
//! This crate describes a GitHub Actions workflow run and its jobs, turns them
//! into a Telegram-ready summary, and defines the two ports the orchestrator
//! needs: somewhere to read runs from and somewhere to send messages to.
//! Infrastructure crates implement the ports; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `github` and `telegram` crates define
//! *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RunId`, `RepositoryId`, `ChatId`, etc.) |
//! | [`types`] | Run/job model, conclusions, elapsed time, outgoing messages |
//! | [`format`] | Duration computation and message rendering |
//! | [`ports`] | `WorkflowSource` and `MessageSink` traits |
//! | [`errors`] | Top-level error and retry-policy types |

pub mod errors;
pub mod format;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{BoxError, HasRetryPolicy, NotifyError, RetryPolicy, Stage};
pub use format::{compute_duration, format_message, job_elapsed, MAX_MESSAGE_UNITS};
pub use identifiers::{ChatId, JobId, NotificationId, RepositoryId, RunId, SecretToken};
pub use ports::{BotIdentity, MessageSink, WorkflowSource};
pub use types::{
    status_icon, Conclusion, Elapsed, Job, OutgoingMessage, OverallStatus, ParseMode, Timestamp,
    WorkflowRun,
};
