use coverage_advisor::error::AppError;
use coverage_advisor::recommendations::{
    FormSubmission, ProfileRepository, RepositoryError, SessionId, SessionRecord,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Session store standing in for the external form/session layer.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileRepository {
    records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("session store mutex poisoned".to_string())
}

impl ProfileRepository for InMemoryProfileRepository {
    fn store(&self, record: SessionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.insert(record.session_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(session_id).cloned())
    }
}

#[cfg(test)]
impl InMemoryProfileRepository {
    pub(crate) fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().map_err(poisoned)?.len())
    }
}

pub(crate) fn read_submission(path: &Path) -> Result<FormSubmission, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
