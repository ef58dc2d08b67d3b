use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use report::{Job, RepositoryId, RunId, SecretToken, WorkflowRun, WorkflowSource};
use reqwest::header::{HeaderMap, ACCEPT};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::models::{ApiErrorDto, JobsPageDto, RepositoryDto, WorkflowRunDto};
use crate::GithubError;

/// Public GitHub REST endpoint. GitHub Enterprise Server runners export
/// their own in `GITHUB_API_URL`.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const JOBS_PER_PAGE: u32 = 100;
const USER_AGENT: &str = concat!("workflow-notify/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// Base URL without a trailing slash, e.g. `https://api.github.com`.
    pub api_base_url: String,
    pub token: SecretToken,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GithubConfig {
    /// Settings for the public API with a 30 second timeout.
    pub fn new(token: SecretToken) -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Reads workflow runs and jobs through the GitHub REST API.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: SecretToken,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        let url = format!("{}{}", self.api_base, path);
        debug!(%url, "GitHub API request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(self.token.expose())
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Primary limit: no requests left. Secondary limit: GitHub asks
            // for a pause with `retry-after` while quota remains.
            let rate_limited = header_str(response.headers(), "x-ratelimit-remaining") == Some("0")
                || response.headers().contains_key("retry-after");
            let retry_after = retry_hint(response.headers());
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorDto>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(GithubError::Status {
                status: status.as_u16(),
                message,
                retry_after,
                rate_limited,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WorkflowSource for GithubClient {
    type Error = GithubError;

    #[instrument(skip_all, fields(%repo))]
    async fn repository_name(&self, repo: &RepositoryId) -> Result<String, GithubError> {
        let path = format!("/repos/{}/{}", repo.owner(), repo.name());
        let dto: RepositoryDto = self.get_json(&path, &[]).await?;
        Ok(dto.full_name)
    }

    #[instrument(skip_all, fields(%repo, %run))]
    async fn workflow_run(&self, repo: &RepositoryId, run: RunId) -> Result<WorkflowRun, GithubError> {
        let path = format!("/repos/{}/{}/actions/runs/{}", repo.owner(), repo.name(), run);
        let dto: WorkflowRunDto = self.get_json(&path, &[]).await?;
        Ok(dto.into())
    }

    #[instrument(skip_all, fields(%repo, %run))]
    async fn workflow_jobs(&self, repo: &RepositoryId, run: RunId) -> Result<Vec<Job>, GithubError> {
        let path = format!(
            "/repos/{}/{}/actions/runs/{}/jobs",
            repo.owner(),
            repo.name(),
            run
        );

        let mut jobs = Vec::new();
        let mut page = 1u32;
        loop {
            let query = [
                ("per_page", JOBS_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let batch: JobsPageDto = self.get_json(&path, &query).await?;
            let received = batch.jobs.len();
            jobs.extend(batch.jobs.into_iter().map(Job::from));
            debug!(page, received, total = batch.total_count, "Fetched jobs page");

            if received == 0 || jobs.len() as u64 >= batch.total_count {
                return Ok(jobs);
            }
            page += 1;
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// `retry-after` is in seconds; `x-ratelimit-reset` is a Unix timestamp.
fn retry_hint(headers: &HeaderMap) -> Option<Duration> {
    if let Some(secs) = header_str(headers, "retry-after").and_then(|v| v.trim().parse::<u64>().ok()) {
        return Some(Duration::from_secs(secs));
    }
    let reset = header_str(headers, "x-ratelimit-reset")?.trim().parse::<i64>().ok()?;
    let wait = reset.saturating_sub(Utc::now().timestamp()).max(0);
    Some(Duration::from_secs(wait as u64))
}
