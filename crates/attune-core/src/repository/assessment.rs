//! Assessment repository trait definition.

use attune_types::assessment::Assessment;
use attune_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for scored screening persistence.
///
/// Implementations live in attune-infra (e.g., `SqliteAssessmentRepository`).
pub trait AssessmentRepository: Send + Sync {
    /// Persist a new assessment with its explanation fields.
    fn insert(
        &self,
        assessment: &Assessment,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get an assessment by ID. Returns `None` when it belongs to another owner.
    fn get(
        &self,
        owner_id: &str,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Assessment>, RepositoryError>> + Send;
}
