//! Bounded retry on rate limiting, rotating to a new credential per attempt.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use attune_types::config::RotationConfig;
use attune_types::llm::LlmError;

use super::rotation::{Credential, CredentialRotator};

/// Wraps a single outbound call with credential rotation and linear backoff.
///
/// Only [`LlmError::RateLimited`] is retried. Every other error, including
/// configuration and counter failures raised while picking a credential,
/// propagates after the attempt that produced it.
#[derive(Debug)]
pub struct RetryPolicy {
    rotator: Arc<CredentialRotator>,
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(rotator: Arc<CredentialRotator>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            rotator,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(rotator: Arc<CredentialRotator>, config: &RotationConfig) -> Self {
        Self::new(
            rotator,
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `call` with a freshly rotated credential until it succeeds, fails
    /// with a non-rate-limit error, or the attempt budget runs out.
    ///
    /// The wait after failed attempt `n` (1-based) is `base_delay * n`. When
    /// the final attempt is also rate limited the error is escalated to
    /// [`LlmError::Provider`] with status 429.
    pub async fn execute<T, F, Fut>(&self, provider: &str, mut call: F) -> Result<T, LlmError>
    where
        F: FnMut(Credential) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 1;
        loop {
            let credential = self.rotator.next_credential(provider).await?;
            let slot = credential.slot;

            match call(credential).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_rate_limited() && attempt < self.max_attempts => {
                    let delay = self.base_delay * attempt;
                    tracing::warn!(
                        provider,
                        slot,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "rate limited, rotating credential"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(LlmError::RateLimited {
                    provider: name,
                    latency_ms,
                    ..
                }) => {
                    tracing::error!(
                        provider,
                        attempts = attempt,
                        "rate limited on every attempt, giving up"
                    );
                    return Err(LlmError::Provider {
                        provider: name,
                        status: Some(429),
                        latency_ms,
                        message: format!("rate limited after {attempt} attempts"),
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
