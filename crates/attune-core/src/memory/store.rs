//! MemoryRepository trait definition.
//!
//! Append-only, owner-scoped persistence for memory records. Follows the
//! same RPITIT pattern as the other repository traits.

use attune_types::error::RepositoryError;
use attune_types::memory::MemoryRecord;

/// Repository trait for long-term memory persistence.
///
/// Implementations live in attune-infra (e.g., `SqliteMemoryRepository`).
pub trait MemoryRepository: Send + Sync {
    /// Append a new record. Records are never updated or deleted.
    fn insert(
        &self,
        record: &MemoryRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The owner's most recent records, ordered by `created_at DESC, id DESC`.
    fn recent_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryRecord>, RepositoryError>> + Send;
}
