//! ThreadRepository trait definition.
//!
//! Threads are append-only. Follows the same RPITIT pattern as the other
//! repository traits.

use attune_types::chat::{ConversationThread, ThreadMessage};
use attune_types::error::RepositoryError;

/// Repository trait for conversation thread persistence.
///
/// Implementations live in attune-infra (e.g., `SqliteThreadRepository`).
pub trait ThreadRepository: Send + Sync {
    /// Append `messages` to the tail of the thread, creating it if needed.
    ///
    /// The whole batch lands contiguously: concurrent appends to the same
    /// `(owner_id, thread_id)` never interleave or drop messages.
    fn append(
        &self,
        owner_id: &str,
        thread_id: &str,
        messages: &[ThreadMessage],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Load a thread with its messages in append order.
    fn get_thread(
        &self,
        owner_id: &str,
        thread_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ConversationThread>, RepositoryError>> + Send;
}
