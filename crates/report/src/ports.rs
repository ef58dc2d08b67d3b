//! Port traits implemented by the infrastructure crates.
//!
//! The dispatcher depends only on these traits. `github::GithubClient`
//! implements [`WorkflowSource`]; `telegram::TelegramClient` implements
//! [`MessageSink`]. Tests substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ChatId, HasRetryPolicy, Job, OutgoingMessage, RepositoryId, RunId, WorkflowRun};

/// Read access to workflow runs and their jobs.
#[async_trait]
pub trait WorkflowSource: Send + Sync {
    /// Error reported by this source.
    type Error: std::error::Error + HasRetryPolicy + Send + Sync + 'static;

    /// Confirms the repository is readable with the configured credentials
    /// and returns its canonical `owner/name`.
    async fn repository_name(&self, repo: &RepositoryId) -> Result<String, Self::Error>;

    /// Fetches a single workflow run.
    async fn workflow_run(&self, repo: &RepositoryId, run: RunId)
        -> Result<WorkflowRun, Self::Error>;

    /// Fetches every job of a workflow run, in the order the API lists them.
    async fn workflow_jobs(&self, repo: &RepositoryId, run: RunId) -> Result<Vec<Job>, Self::Error>;
}

/// The account a [`MessageSink`] sends messages as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

/// Somewhere notifications can be delivered.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Error reported by this sink.
    type Error: std::error::Error + HasRetryPolicy + Send + Sync + 'static;

    /// Verifies the credentials and returns the identity messages are sent as.
    async fn check_connection(&self) -> Result<BotIdentity, Self::Error>;

    /// Delivers `message` to `chat`.
    async fn send(&self, chat: &ChatId, message: &OutgoingMessage) -> Result<(), Self::Error>;
}
