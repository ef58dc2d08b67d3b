//! Notification orchestration.
//!
//! [`Dispatcher`] sequences calls between the business logic in the
//! [`report`] crate and the two infrastructure ports (`WorkflowSource`,
//! `MessageSink`). It contains no domain rules of its own: it decides only
//! the order of steps, which stage a failure belongs to, and whether a
//! failed call is attempted again (see [`retry`]).
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Generic over the port traits, so the same code
//! runs against the real GitHub/Telegram clients and against test fakes.

mod dispatcher;
pub mod retry;

pub use dispatcher::{DispatchOutcome, DispatchSettings, Dispatcher};
pub use retry::{with_retry, RetrySchedule};
