use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Project, ProjectId, ValidationError};
use super::fabric::CheckStatus;
use super::repository::{ProjectRecord, ProjectRepository, RepositoryError};
use super::resolver::{
    ComplianceResult, ResolveError, ResolverSettings, RuleResolver, SectionStatus,
};
use super::table::{ConfigurationError, RuleTable, RuleTableCache};

/// Days between a compliance check and the date it should be repeated.
pub const REVIEW_INTERVAL_DAYS: i64 = 30;

/// Service composing the project store, the rule table cache, and the resolver.
pub struct ComplianceService<R> {
    repository: Arc<R>,
    rules: Arc<RuleTableCache>,
    resolver: RuleResolver,
    sequence: AtomicU64,
}

/// Outcome of checking a stored project against the current rule table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub project_id: ProjectId,
    pub checked_at: DateTime<Utc>,
    pub next_review_on: NaiveDate,
    /// Combined fabric verdict; absent when no zone requirements resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fabric_status: Option<CheckStatus>,
    pub result: ComplianceResult,
}

impl<R> ComplianceService<R>
where
    R: ProjectRepository + 'static,
{
    pub fn new(repository: Arc<R>, rules: Arc<RuleTableCache>) -> Self {
        Self::with_settings(repository, rules, ResolverSettings::default())
    }

    pub fn with_settings(
        repository: Arc<R>,
        rules: Arc<RuleTableCache>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            repository,
            rules,
            resolver: RuleResolver::new(settings),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn rules(&self) -> &Arc<RuleTableCache> {
        &self.rules
    }

    fn next_project_id(&self) -> ProjectId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ProjectId(format!("proj-{id:06}"))
    }

    /// Validate and store a project, assigning it a fresh identifier.
    pub fn register(&self, project: Project) -> Result<ProjectRecord, ComplianceServiceError> {
        project.validate()?;

        let record = ProjectRecord {
            project_id: self.next_project_id(),
            registered_at: Utc::now(),
            project,
        };

        let stored = self.repository.insert(record)?;
        info!(project_id = %stored.project_id, "project registered");
        Ok(stored)
    }

    /// Resolve an ad-hoc project against the cached rule table.
    pub fn resolve(&self, project: &Project) -> Result<ComplianceResult, ComplianceServiceError> {
        let table = self.rules.get()?;
        let result = self.resolver.resolve(project, &table)?;
        info!(
            status = result.status.label(),
            applicable = result.count(SectionStatus::Applicable),
            requires_review = result.count(SectionStatus::RequiresReview),
            "compliance resolved"
        );
        Ok(result)
    }

    /// Resolve a stored project and stamp the report with the current time.
    pub fn check(
        &self,
        project_id: &ProjectId,
    ) -> Result<ComplianceReport, ComplianceServiceError> {
        self.check_at(project_id, Utc::now())
    }

    pub fn check_at(
        &self,
        project_id: &ProjectId,
        checked_at: DateTime<Utc>,
    ) -> Result<ComplianceReport, ComplianceServiceError> {
        let record = self.get(project_id)?;
        let result = self.resolve(&record.project)?;

        Ok(ComplianceReport {
            project_id: record.project_id,
            checked_at,
            next_review_on: (checked_at + Duration::days(REVIEW_INTERVAL_DAYS)).date_naive(),
            fabric_status: result.fabric_status(),
            result,
        })
    }

    /// Fetch a stored project for API responses.
    pub fn get(&self, project_id: &ProjectId) -> Result<ProjectRecord, ComplianceServiceError> {
        let record = self
            .repository
            .fetch(project_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<ProjectRecord>, ComplianceServiceError> {
        Ok(self.repository.list()?)
    }

    /// Re-read the rule files; the previous table stays active if the reload fails.
    pub fn reload_rules(&self) -> Result<Arc<RuleTable>, ComplianceServiceError> {
        match self.rules.reload() {
            Ok(table) => {
                info!(sections = table.len(), "rule table reloaded");
                Ok(table)
            }
            Err(err) => {
                warn!(section = err.section(), "rule table reload rejected");
                Err(err.into())
            }
        }
    }
}

/// Error raised by the compliance service.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Rules(#[from] ConfigurationError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
