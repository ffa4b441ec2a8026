//! Profile repository trait definition.
//!
//! The core only reads profiles; onboarding writes them elsewhere.

use attune_types::error::RepositoryError;
use attune_types::profile::Profile;

pub trait ProfileRepository: Send + Sync {
    fn get(
        &self,
        owner_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;
}
