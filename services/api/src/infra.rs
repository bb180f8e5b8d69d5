use metrics_exporter_prometheus::PrometheusHandle;
use ncc_compliance::compliance::{ProjectId, ProjectRecord, ProjectRepository, RepositoryError};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local project store; records are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProjectRepository {
    records: Arc<Mutex<BTreeMap<ProjectId, ProjectRecord>>>,
}

impl InMemoryProjectRepository {
    fn records(
        &self,
    ) -> Result<MutexGuard<'_, BTreeMap<ProjectId, ProjectRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("project store lock poisoned".to_string()))
    }
}

impl ProjectRepository for InMemoryProjectRepository {
    fn insert(&self, record: ProjectRecord) -> Result<ProjectRecord, RepositoryError> {
        let mut guard = self.records()?;
        if guard.contains_key(&record.project_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.project_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<ProjectRecord>, RepositoryError> {
        Ok(self.records()?.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        Ok(self.records()?.values().cloned().collect())
    }
}
