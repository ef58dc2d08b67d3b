//! The notification run: preflight, fetch, render, deliver.

use report::{
    format_message, ChatId, MessageSink, NotificationId, NotifyError, OutgoingMessage,
    RepositoryId, RunId, Stage, WorkflowSource,
};
use tracing::{info, info_span, Instrument};

use crate::retry::{with_retry, RetrySchedule};

/// What to report on and where to send it.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub repository: RepositoryId,
    pub run_id: RunId,
    pub chat_id: ChatId,
    pub retry: RetrySchedule,
    /// Render the message but do not send it.
    pub dry_run: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub notification_id: NotificationId,
    pub message: OutgoingMessage,
    /// `false` only for dry runs.
    pub delivered: bool,
}

/// Drives one notification from preflight checks to delivery.
pub struct Dispatcher<S, M> {
    source: S,
    sink: M,
    settings: DispatchSettings,
}

impl<S, M> Dispatcher<S, M>
where
    S: WorkflowSource,
    M: MessageSink,
{
    pub fn new(source: S, sink: M, settings: DispatchSettings) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    /// Executes every step in order and stops at the first failure.
    ///
    /// 1. Telegram connection check.
    /// 2. GitHub repository access check.
    /// 3. Fetch the run, then its jobs.
    /// 4. Render the message.
    /// 5. Send it (skipped for dry runs).
    pub async fn run(&self) -> Result<DispatchOutcome, NotifyError> {
        let notification_id = NotificationId::new_random();
        let span = info_span!(
            "notification",
            %notification_id,
            repository = %self.settings.repository,
            run_id = %self.settings.run_id,
        );
        self.run_steps(notification_id).instrument(span).await
    }

    async fn run_steps(&self, notification_id: NotificationId) -> Result<DispatchOutcome, NotifyError> {
        let settings = &self.settings;
        let retry = &settings.retry;

        info!("Checking Telegram connection");
        let bot = with_retry(retry, "telegram.get_me", || self.sink.check_connection())
            .await
            .map_err(|e| NotifyError::at_stage(Stage::TelegramConnection, e))?;
        info!(bot_id = bot.id, bot_username = ?bot.username, "Connected to Telegram API");

        info!("Checking GitHub API access");
        let full_name = with_retry(retry, "github.get_repository", || {
            self.source.repository_name(&settings.repository)
        })
        .await
        .map_err(|e| NotifyError::at_stage(Stage::GithubAccess, e))?;
        info!(repository = %full_name, "GitHub API access confirmed");

        info!("Fetching workflow run and jobs");
        let run = with_retry(retry, "github.get_workflow_run", || {
            self.source.workflow_run(&settings.repository, settings.run_id)
        })
        .await
        .map_err(|e| NotifyError::at_stage(Stage::FetchRun, e))?;
        let jobs = with_retry(retry, "github.list_jobs", || {
            self.source.workflow_jobs(&settings.repository, settings.run_id)
        })
        .await
        .map_err(|e| NotifyError::at_stage(Stage::FetchJobs, e))?;
        info!(workflow = %run.name, jobs = jobs.len(), "Fetched workflow run");

        let message = format_message(&run, &jobs);

        if settings.dry_run {
            info!("Dry run, message not sent");
            return Ok(DispatchOutcome {
                notification_id,
                message,
                delivered: false,
            });
        }

        info!(chat_id = %settings.chat_id, "Sending message to Telegram");
        with_retry(retry, "telegram.send_message", || {
            self.sink.send(&settings.chat_id, &message)
        })
        .await
        .map_err(|e| NotifyError::at_stage(Stage::SendMessage, e))?;
        info!("Message sent");

        Ok(DispatchOutcome {
            notification_id,
            message,
            delivered: true,
        })
    }
}
