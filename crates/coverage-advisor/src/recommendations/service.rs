use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{ProductSelection, Recommendation, SessionId};
use super::engine::{AssemblyInvariantViolation, AssemblyMode, RecommendationEngine};
use super::form::FormSubmission;
use super::intake::{InvalidProfileError, ProfileNormalizer};
use super::repository::{ProfileRepository, RepositoryError, SessionRecord};

/// Service composing the normalizer, session repository, and recommendation engine.
pub struct RecommendationService<R> {
    normalizer: Arc<ProfileNormalizer>,
    repository: Arc<R>,
    engine: Arc<RecommendationEngine>,
}

impl<R> RecommendationService<R>
where
    R: ProfileRepository + 'static,
{
    pub fn new(repository: Arc<R>, mode: AssemblyMode) -> Self {
        Self::with_engine(repository, RecommendationEngine::new(mode))
    }

    pub fn with_engine(repository: Arc<R>, engine: RecommendationEngine) -> Self {
        Self {
            normalizer: Arc::new(ProfileNormalizer::new()),
            repository,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Store the form submission for a session, replacing any previous one.
    pub fn save_profile(
        &self,
        session_id: SessionId,
        submission: FormSubmission,
    ) -> Result<SessionRecord, RecommendationServiceError> {
        let record = SessionRecord::new(session_id, submission);
        self.repository.store(record.clone())?;
        info!(session_id = %record.session_id.0, "stored session profile");
        Ok(record)
    }

    /// Recommendations for the profile stored under `session_id`.
    pub fn recommend(
        &self,
        session_id: &SessionId,
        selection: ProductSelection,
    ) -> Result<Vec<Recommendation>, RecommendationServiceError> {
        let record = self
            .repository
            .fetch(session_id)?
            .ok_or(RepositoryError::NotFound)?;

        let recommendations = self.evaluate(&record.submission, selection)?;
        info!(
            session_id = %session_id.0,
            count = recommendations.len(),
            "served recommendations"
        );
        Ok(recommendations)
    }

    /// Stateless evaluation of an inline submission.
    pub fn evaluate(
        &self,
        submission: &FormSubmission,
        selection: ProductSelection,
    ) -> Result<Vec<Recommendation>, RecommendationServiceError> {
        let lines = submission.requested_lines(selection);
        let profiles = self.normalizer.normalize_lines(submission, &lines)?;

        let mut recommendations = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            let recommendation = self.engine.recommend(profile)?;
            debug!(
                product = %recommendation.kind(),
                coverages = recommendation.coverages().len(),
                special_clauses = recommendation.special_clauses().len(),
                "assembled recommendation"
            );
            recommendations.push(recommendation);
        }

        Ok(recommendations)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationServiceError {
    #[error(transparent)]
    Profile(#[from] InvalidProfileError),
    #[error(transparent)]
    Engine(#[from] AssemblyInvariantViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
