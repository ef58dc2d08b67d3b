//! GitHub infrastructure adapter.
//!
//! Implements [`report::WorkflowSource`] on top of the GitHub REST API using
//! `reqwest`. Three endpoints are used:
//!
//! | Endpoint | Purpose |
//! |----------|---------|
//! | `GET /repos/{owner}/{repo}` | Access check; returns `full_name` |
//! | `GET /repos/{owner}/{repo}/actions/runs/{run_id}` | The workflow run |
//! | `GET /repos/{owner}/{repo}/actions/runs/{run_id}/jobs` | Its jobs, paged 100 at a time |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Authentication, API versioning headers, pagination,
//! and rate-limit interpretation are handled here; the [`report`] crate never
//! sees them. Failures are classified for retry via
//! [`report::HasRetryPolicy`].

mod client;
mod error;
mod models;

pub use client::{GithubClient, GithubConfig, DEFAULT_API_URL};
pub use error::GithubError;
