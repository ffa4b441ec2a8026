//! Shared HTTP plumbing for the provider backends.
//!
//! Sends one JSON request, times it, classifies the outcome into the
//! [`LlmError`] taxonomy, and logs provider, model, status and latency on a
//! `gen_ai.*` span. Request and response bodies are never logged.

use std::time::{Duration, Instant};

use attune_observe::genai_attrs::{
    ATTUNE_CREDENTIAL_SLOT, ATTUNE_LATENCY_MS, HTTP_RESPONSE_STATUS_CODE,
};
use attune_types::llm::LlmError;
use serde::de::DeserializeOwned;
use tracing::Instrument;

/// Longest backend error body carried into [`LlmError::Provider`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Identifies one outbound call for logging and error attribution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallContext<'a> {
    pub provider: &'static str,
    pub operation: &'static str,
    pub model: &'a str,
    pub slot: u32,
}

/// Build a reqwest client with the configured request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("failed to create HTTP client: {e}")))
}

/// Send `request` and decode a successful JSON body into `T`.
///
/// - 429 becomes [`LlmError::RateLimited`], honouring a numeric `Retry-After`.
/// - Any other non-2xx status becomes [`LlmError::Provider`] with the status.
/// - Transport failures, timeouts included, become [`LlmError::Provider`]
///   with no status, so the retry policy does not rotate on them.
pub(crate) async fn send_json<T: DeserializeOwned>(
    ctx: CallContext<'_>,
    request: reqwest::RequestBuilder,
) -> Result<T, LlmError> {
    let span = tracing::info_span!(
        "gen_ai.call",
        gen_ai.operation.name = ctx.operation,
        gen_ai.provider.name = ctx.provider,
        gen_ai.request.model = ctx.model,
        attune.credential.slot = tracing::field::Empty,
        http.response.status_code = tracing::field::Empty,
        attune.latency_ms = tracing::field::Empty,
    );
    span.record(ATTUNE_CREDENTIAL_SLOT, ctx.slot);

    exchange(ctx, request).instrument(span).await
}

async fn exchange<T: DeserializeOwned>(
    ctx: CallContext<'_>,
    request: reqwest::RequestBuilder,
) -> Result<T, LlmError> {
    let span = tracing::Span::current();
    let started = Instant::now();
    let sent = request.send().await;
    let latency_ms = started.elapsed().as_millis() as u64;
    span.record(ATTUNE_LATENCY_MS, latency_ms);

    let response = match sent {
        Ok(response) => response,
        Err(e) => {
            let message = if e.is_timeout() {
                format!("request timed out after {latency_ms}ms")
            } else {
                format!("HTTP request failed: {e}")
            };
            tracing::warn!(latency_ms, "provider call failed before a response");
            return Err(LlmError::Provider {
                provider: ctx.provider.to_string(),
                status: None,
                latency_ms,
                message,
            });
        }
    };

    let status = response.status();
    span.record(HTTP_RESPONSE_STATUS_CODE, status.as_u16());

    if status.as_u16() == 429 {
        let retry_after_ms = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        tracing::warn!(status = 429, latency_ms, "provider rate limited");
        return Err(LlmError::RateLimited {
            provider: ctx.provider.to_string(),
            latency_ms,
            retry_after_ms,
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), latency_ms, "provider call failed");
        return Err(LlmError::Provider {
            provider: ctx.provider.to_string(),
            status: Some(status.as_u16()),
            latency_ms,
            message: format!("HTTP {status}: {}", truncate(&body)),
        });
    }

    let decoded = response.json::<T>().await.map_err(|e| {
        LlmError::Deserialization(format!("failed to parse {} response: {e}", ctx.provider))
    })?;
    tracing::info!(status = status.as_u16(), latency_ms, "provider call succeeded");
    Ok(decoded)
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
