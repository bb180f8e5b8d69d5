use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Project, ProjectId};

/// Stored project together with the identifier the service assigned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub registered_at: DateTime<Utc>,
    pub project: Project,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ProjectRepository: Send + Sync {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError>;
    fn fetch(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
