//! Round-robin credential rotation across a fixed pool of API keys.
//!
//! Every outbound provider call draws a fresh credential. The slot is picked
//! from a durable per-provider counter, so concurrent callers and separate
//! processes sharing one database spread their load over the whole pool
//! instead of hammering the first key.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use attune_types::error::RepositoryError;
use attune_types::llm::LlmError;
use secrecy::SecretString;

/// Durable, atomic per-provider counter.
///
/// Implementations live in attune-infra (e.g., `SqliteCounterStore`). The
/// first increment for an unseen provider returns 1.
pub trait CounterStore: Send + Sync {
    /// Atomically add one to the provider's counter and return the new value.
    fn increment(
        &self,
        provider: &str,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`CounterStore`].
pub trait CounterStoreDyn: Send + Sync {
    fn increment_boxed<'a>(&'a self, provider: &'a str) -> BoxFuture<'a, u64>;
}

impl<T: CounterStore> CounterStoreDyn for T {
    fn increment_boxed<'a>(&'a self, provider: &'a str) -> BoxFuture<'a, u64> {
        Box::pin(self.increment(provider))
    }
}

/// Type-erased counter store, so providers need not be generic over it.
pub struct BoxCounterStore {
    inner: Box<dyn CounterStoreDyn>,
}

impl BoxCounterStore {
    pub fn new<T: CounterStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub async fn increment(&self, provider: &str) -> Result<u64, RepositoryError> {
        self.inner.increment_boxed(provider).await
    }
}

/// Where credential values come from (process environment in production).
pub trait CredentialSource: Send + Sync {
    /// Look up a secret by its full name, e.g. `GEMINI_API_3`.
    fn lookup(&self, name: &str) -> Option<SecretString>;
}

/// A credential selected for exactly one outbound call.
#[derive(Debug, Clone)]
pub struct Credential {
    pub provider: String,
    /// Zero-based slot in the pool.
    pub slot: u32,
    /// Counter value that produced this slot.
    pub counter: u64,
    pub key: SecretString,
}

/// Name under which a slot's key is stored: `{PROVIDER}_API_{slot + 1}`.
pub fn credential_name(provider: &str, slot: u32) -> String {
    format!("{}_API_{}", provider.to_uppercase(), slot + 1)
}

/// Picks the next credential for a provider using a shared counter.
pub struct CredentialRotator {
    counters: BoxCounterStore,
    source: Arc<dyn CredentialSource>,
    pool_size: u32,
}

impl CredentialRotator {
    /// A `pool_size` of zero is treated as one.
    pub fn new(counters: BoxCounterStore, source: Arc<dyn CredentialSource>, pool_size: u32) -> Self {
        Self {
            counters,
            source,
            pool_size: pool_size.max(1),
        }
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// Increment the provider's counter and return the credential in slot
    /// `counter % pool_size`.
    ///
    /// A missing slot is a configuration error; it is never skipped in favour
    /// of a neighbouring slot.
    pub async fn next_credential(&self, provider: &str) -> Result<Credential, LlmError> {
        let counter = self
            .counters
            .increment(provider)
            .await
            .map_err(|e| LlmError::CounterUnavailable(e.to_string()))?;

        let slot = (counter % u64::from(self.pool_size)) as u32;
        let name = credential_name(provider, slot);

        let key = self.source.lookup(&name).ok_or_else(|| {
            LlmError::Configuration(format!("credential {name} is not set"))
        })?;

        tracing::debug!(provider, slot, counter, "selected credential");

        Ok(Credential {
            provider: provider.to_string(),
            slot,
            counter,
            key,
        })
    }
}

impl std::fmt::Debug for CredentialRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRotator")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use secrecy::ExposeSecret;

    use super::test_support::*;
    use super::*;

    #[test]
    fn test_credential_name_is_one_based_and_uppercase() {
        assert_eq!(credential_name("gemini", 0), "GEMINI_API_1");
        assert_eq!(credential_name("nvidia", 4), "NVIDIA_API_5");
    }

    #[tokio::test]
    async fn test_first_call_uses_slot_one() {
        // First increment returns 1, so slot 1 (GEMINI_API_2) is used first.
        let rotator = rotator("gemini", 5);
        let cred = rotator.next_credential("gemini").await.unwrap();
        assert_eq!(cred.counter, 1);
        assert_eq!(cred.slot, 1);
        assert_eq!(cred.key.expose_secret(), "key-2");
    }

    #[tokio::test]
    async fn test_sequential_calls_cycle_through_pool() {
        let rotator = rotator("nvidia", 5);
        let mut slots = Vec::new();
        for _ in 0..10 {
            slots.push(rotator.next_credential("nvidia").await.unwrap().slot);
        }
        assert_eq!(slots, vec![1, 2, 3, 4, 0, 1, 2, 3, 4, 0]);
    }

    #[tokio::test]
    async fn test_concurrent_calls_get_distinct_counters() {
        let rotator = Arc::new(rotator("gemini", 5));
        let mut handles = Vec::new();
        for _ in 0..25 {
            let rotator = Arc::clone(&rotator);
            handles.push(tokio::spawn(async move {
                rotator.next_credential("gemini").await.unwrap()
            }));
        }

        let mut counters = HashSet::new();
        let mut per_slot: HashMap<u32, usize> = HashMap::new();
        for handle in handles {
            let cred = handle.await.unwrap();
            assert_eq!(cred.slot as u64, cred.counter % 5);
            assert!(counters.insert(cred.counter), "counter reused");
            *per_slot.entry(cred.slot).or_default() += 1;
        }
        // 25 consecutive counters over 5 slots hit every slot equally.
        assert_eq!(per_slot.len(), 5);
        assert!(per_slot.values().all(|&n| n == 5));
    }

    #[tokio::test]
    async fn test_providers_have_independent_counters() {
        let mut map = MapSource::full("gemini", 5).0;
        map.extend(MapSource::full("nvidia", 5).0);
        let rotator = CredentialRotator::new(
            BoxCounterStore::new(MemoryCounterStore::default()),
            Arc::new(MapSource(map)),
            5,
        );
        rotator.next_credential("gemini").await.unwrap();
        rotator.next_credential("gemini").await.unwrap();
        let cred = rotator.next_credential("nvidia").await.unwrap();
        assert_eq!(cred.counter, 1);
    }

    #[tokio::test]
    async fn test_missing_slot_is_configuration_error() {
        let mut source = MapSource::full("gemini", 5);
        source.0.remove("GEMINI_API_2");
        let rotator = CredentialRotator::new(
            BoxCounterStore::new(MemoryCounterStore::default()),
            Arc::new(source),
            5,
        );
        let err = rotator.next_credential("gemini").await.unwrap_err();
        match err {
            LlmError::Configuration(msg) => assert!(msg.contains("GEMINI_API_2")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_counter_failure_is_counter_unavailable() {
        let rotator = CredentialRotator::new(
            BoxCounterStore::new(MemoryCounterStore::failing()),
            Arc::new(MapSource::full("gemini", 5)),
            5,
        );
        let err = rotator.next_credential("gemini").await.unwrap_err();
        assert!(matches!(err, LlmError::CounterUnavailable(_)));
    }

    #[test]
    fn test_zero_pool_size_is_clamped() {
        let rotator = CredentialRotator::new(
            BoxCounterStore::new(MemoryCounterStore::default()),
            Arc::new(MapSource::full("gemini", 1)),
            0,
        );
        assert_eq!(rotator.pool_size(), 1);
    }
}
