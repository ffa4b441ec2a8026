//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Provider calls open a span named `"gen_ai.{operation}"` carrying these
//! fields. The status and latency fields are declared empty and recorded
//! once the backend answers, so they must match the span declaration.
//!
//! User text never goes into any of them.

// --- Required attributes ---

/// The operation being performed (see the `OP_*` values).
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The backend serving the call (see the `PROVIDER_*` values).
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

// --- Recommended attributes ---

/// The model ID requested (e.g., "gemini-2.5-flash").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// HTTP status returned by the backend. Absent on transport failures.
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";

/// Wall-clock time of the HTTP exchange in milliseconds.
pub const ATTUNE_LATENCY_MS: &str = "attune.latency_ms";

/// Credential slot used for the attempt. Never the key itself.
pub const ATTUNE_CREDENTIAL_SLOT: &str = "attune.credential.slot";

// --- Operation name values ---

pub const OP_CHAT: &str = "chat";

pub const OP_EMBEDDINGS: &str = "embeddings";

pub const OP_RERANK: &str = "rerank";

// --- Provider name values ---

pub const PROVIDER_GEMINI: &str = "gemini";

pub const PROVIDER_NVIDIA: &str = "nvidia";
