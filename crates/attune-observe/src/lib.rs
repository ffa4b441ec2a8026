//! Observability for Attune: subscriber setup and the attribute names used
//! when logging model provider calls.

pub mod genai_attrs;
pub mod tracing_setup;
