//! Command line and environment configuration.
//!
//! Every flag falls back to an environment variable, so inside GitHub Actions
//! the binary runs with no arguments: `GITHUB_TOKEN`, `GITHUB_REPOSITORY`,
//! `GITHUB_RUN_ID` and `GITHUB_API_URL` come from the runner, and the two
//! Telegram values come from repository secrets.

use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::{Parser, ValueEnum};
use dispatch::{DispatchSettings, RetrySchedule};
use github::GithubConfig;
use report::{ChatId, NotifyError, RepositoryId, RunId, SecretToken};
use telegram::TelegramConfig;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Post a GitHub Actions workflow run summary to a Telegram chat.
#[derive(Debug, Parser)]
#[command(name = "workflow-notify", author, version, about, long_about = None)]
pub struct Cli {
    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: String,

    /// Chat id or @channel username that receives the message.
    #[arg(long, env = "TELEGRAM_CHAT_ID", allow_hyphen_values = true)]
    pub chat_id: String,

    /// Token used to read the workflow run.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Repository in owner/name form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Workflow run to report on.
    #[arg(long, env = "GITHUB_RUN_ID")]
    pub run_id: u64,

    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    #[arg(long, env = "TELEGRAM_API_URL", default_value = telegram::DEFAULT_API_URL)]
    pub telegram_api_url: String,

    /// Attempts per API call before giving up on transient failures.
    #[arg(long, env = "NOTIFY_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    /// Timeout for each HTTP request, in seconds.
    #[arg(long, env = "NOTIFY_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    #[arg(long, env = "NOTIFY_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Export spans to this OTLP/gRPC collector.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Print the message instead of sending it.
    #[arg(long, env = "NOTIFY_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,
}

/// Validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dispatch: DispatchSettings,
    pub github: GithubConfig,
    pub telegram: TelegramConfig,
}

impl Cli {
    /// Validates the raw arguments. No network call is made here.
    pub fn into_config(self) -> Result<AppConfig, NotifyError> {
        let telegram_token = SecretToken::new(self.telegram_token)
            .ok_or_else(|| NotifyError::configuration("TELEGRAM_TOKEN is empty"))?;
        let github_token = SecretToken::new(self.github_token)
            .ok_or_else(|| NotifyError::configuration("GITHUB_TOKEN is empty"))?;
        let chat_id = ChatId::new(self.chat_id)
            .ok_or_else(|| NotifyError::configuration("TELEGRAM_CHAT_ID is empty"))?;
        let repository = RepositoryId::parse(&self.repository).ok_or_else(|| {
            NotifyError::configuration(format!(
                "GITHUB_REPOSITORY must look like owner/name, got {:?}",
                self.repository
            ))
        })?;

        if self.max_attempts == 0 {
            return Err(NotifyError::configuration("NOTIFY_MAX_ATTEMPTS must be at least 1"));
        }
        if self.http_timeout_secs == 0 {
            return Err(NotifyError::configuration(
                "NOTIFY_HTTP_TIMEOUT_SECS must be at least 1",
            ));
        }
        let timeout = Duration::from_secs(self.http_timeout_secs);

        Ok(AppConfig {
            dispatch: DispatchSettings {
                repository,
                run_id: RunId::new(self.run_id),
                chat_id,
                retry: RetrySchedule {
                    max_attempts: self.max_attempts,
                    ..RetrySchedule::default()
                },
                dry_run: self.dry_run,
            },
            github: GithubConfig {
                api_base_url: self.github_api_url,
                token: github_token,
                timeout,
            },
            telegram: TelegramConfig {
                api_base_url: self.telegram_api_url,
                token: telegram_token,
                timeout,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every required value is passed explicitly so the ambient environment
    // of a CI runner (which sets GITHUB_* itself) cannot influence the result.
    const BASE_ARGS: &[&str] = &[
        "workflow-notify",
        "--telegram-token",
        "123:abc",
        "--chat-id",
        "-100200",
        "--github-token",
        "ghs_x",
        "--repository",
        "acme/widgets",
        "--run-id",
        "9001",
        "--github-api-url",
        "https://api.github.com",
        "--telegram-api-url",
        "https://api.telegram.org",
    ];

    fn parse(extra: &[&str]) -> Cli {
        let mut args = BASE_ARGS.to_vec();
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn builds_config_from_arguments() {
        let config = parse(&["--max-attempts", "5"]).into_config().unwrap();

        assert_eq!(config.dispatch.repository.to_string(), "acme/widgets");
        assert_eq!(config.dispatch.run_id, RunId::new(9001));
        assert_eq!(config.dispatch.chat_id.as_str(), "-100200");
        assert_eq!(config.dispatch.retry.max_attempts, 5);
        assert_eq!(config.github.token.expose(), "ghs_x");
        assert_eq!(config.telegram.token.expose(), "123:abc");
        assert_eq!(config.telegram.timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_malformed_repository() {
        let mut cli = parse(&[]);
        cli.repository = "just-a-name".into();

        let err = cli.into_config().unwrap_err();

        assert!(err.to_string().starts_with("Configuration error: GITHUB_REPOSITORY"));
    }

    #[test]
    fn rejects_blank_secrets() {
        let mut cli = parse(&[]);
        cli.telegram_token = "  ".into();
        assert!(matches!(
            cli.into_config(),
            Err(NotifyError::Configuration { .. })
        ));
    }

    #[test]
    fn rejects_zero_attempts() {
        let mut cli = parse(&[]);
        cli.max_attempts = 0;
        assert!(matches!(
            cli.into_config(),
            Err(NotifyError::Configuration { .. })
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut cli = parse(&[]);
        cli.http_timeout_secs = 0;

        let err = cli.into_config().unwrap_err();

        assert!(matches!(err, NotifyError::Configuration { .. }));
        assert!(err.to_string().contains("NOTIFY_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn dry_run_env_accepts_numeric_values() {
        use clap::{CommandFactory, FromArgMatches};

        // A variable per case keeps parallel tests from seeing each other.
        let dry_run_from_env = |var: &'static str, value: &str| {
            std::env::set_var(var, value);
            let matches = Cli::command()
                .mut_arg("dry_run", |arg| arg.env(var))
                .try_get_matches_from(BASE_ARGS.iter().copied())
                .unwrap();
            Cli::from_arg_matches(&matches).unwrap().dry_run
        };

        assert!(dry_run_from_env("WORKFLOW_NOTIFY_TEST_DRY_RUN_ONE", "1"));
        assert!(dry_run_from_env("WORKFLOW_NOTIFY_TEST_DRY_RUN_TRUE", "true"));
        assert!(!dry_run_from_env("WORKFLOW_NOTIFY_TEST_DRY_RUN_ZERO", "0"));
        assert!(!dry_run_from_env("WORKFLOW_NOTIFY_TEST_DRY_RUN_OFF", "off"));
    }

    #[test]
    fn debug_output_of_config_hides_tokens() {
        let config = parse(&[]).into_config().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("123:abc"));
        assert!(!rendered.contains("ghs_x"));
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
