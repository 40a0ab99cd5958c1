use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::SessionId;
use super::form::FormSubmission;

/// Form submission stored for a session, as the session layer hands it over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub submission: FormSubmission,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_id: SessionId, submission: FormSubmission) -> Self {
        Self {
            session_id,
            submission,
            updated_at: Utc::now(),
        }
    }
}

/// Session storage seam so the service can be exercised without a datastore.
pub trait ProfileRepository: Send + Sync {
    /// Inserts or replaces the record for its session.
    fn store(&self, record: SessionRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
