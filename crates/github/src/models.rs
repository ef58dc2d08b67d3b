// Wire shapes of the REST responses this crate reads. Only the fields the
// notifier uses are declared; serde ignores the rest.

use report::{Conclusion, Job, JobId, RunId, Timestamp, WorkflowRun};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryDto {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowRunDto {
    pub id: u64,
    pub name: Option<String>,
    pub conclusion: Option<Conclusion>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<WorkflowRunDto> for WorkflowRun {
    fn from(dto: WorkflowRunDto) -> Self {
        WorkflowRun {
            id: RunId::new(dto.id),
            name: dto
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Workflow run {}", dto.id)),
            conclusion: dto.conclusion,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsPageDto {
    pub total_count: u64,
    pub jobs: Vec<JobDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobDto {
    pub id: u64,
    pub name: String,
    pub conclusion: Option<Conclusion>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl From<JobDto> for Job {
    fn from(dto: JobDto) -> Self {
        Job {
            id: JobId::new(dto.id),
            name: dto.name,
            conclusion: dto.conclusion,
            started_at: dto.started_at,
            completed_at: dto.completed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDto {
    pub message: String,
}
