//! Model provider implementations.
//!
//! Concrete implementations of the [`ModelProvider`] trait defined in
//! `attune-core`, plus a factory ([`create_provider`]) that builds the
//! configured backend behind a [`BoxModelProvider`].
//!
//! [`ModelProvider`]: attune_core::llm::provider::ModelProvider

pub mod gemini;
mod http;
pub mod nvidia;

use std::sync::Arc;
use std::time::Duration;

use attune_core::llm::box_provider::BoxModelProvider;
use attune_core::llm::retry::RetryPolicy;
use attune_types::config::ProviderEndpoints;
use attune_types::llm::{LlmError, ProviderKind};

use self::gemini::GeminiProvider;
use self::nvidia::NvidiaProvider;

/// Sampling temperature when a request leaves it unset.
pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Create a [`BoxModelProvider`] for `kind`.
///
/// Every call made through the returned provider draws its credential from
/// `retry`'s rotator. Counters are keyed by provider name, so one policy can
/// serve both backends.
pub fn create_provider(
    kind: ProviderKind,
    endpoints: &ProviderEndpoints,
    retry: Arc<RetryPolicy>,
) -> Result<BoxModelProvider, LlmError> {
    let timeout = Duration::from_secs(endpoints.request_timeout_secs);
    let provider = match kind {
        ProviderKind::Gemini => {
            BoxModelProvider::new(GeminiProvider::new(&endpoints.gemini_base_url, timeout, retry)?)
        }
        ProviderKind::Nvidia => BoxModelProvider::new(NvidiaProvider::new(
            &endpoints.nvidia_base_url,
            &endpoints.nvidia_rerank_base_url,
            timeout,
            retry,
        )?),
    };
    tracing::debug!(provider = %kind, "model provider created");
    Ok(provider)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use attune_core::llm::retry::RetryPolicy;
    use attune_core::llm::rotation::{
        BoxCounterStore, CounterStore, CredentialRotator, CredentialSource, credential_name,
    };
    use attune_types::error::RepositoryError;
    use secrecy::SecretString;

    /// Single-provider counter; enough for one backend per test.
    #[derive(Default)]
    struct LocalCounter(AtomicU64);

    impl CounterStore for LocalCounter {
        async fn increment(&self, _provider: &str) -> Result<u64, RepositoryError> {
            Ok(self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    struct StaticKeys(HashMap<String, String>);

    impl CredentialSource for StaticKeys {
        fn lookup(&self, name: &str) -> Option<SecretString> {
            self.0.get(name).cloned().map(SecretString::from)
        }
    }

    /// A retry policy over `keys` (slot order) with no backoff delay.
    pub fn retry_policy(provider: &str, keys: &[&str], max_attempts: u32) -> RetryPolicy {
        let source = StaticKeys(
            keys.iter()
                .enumerate()
                .map(|(slot, key)| (credential_name(provider, slot as u32), key.to_string()))
                .collect(),
        );
        let rotator = CredentialRotator::new(
            BoxCounterStore::new(LocalCounter::default()),
            Arc::new(source),
            keys.len() as u32,
        );
        RetryPolicy::new(Arc::new(rotator), max_attempts, Duration::ZERO)
    }
}
