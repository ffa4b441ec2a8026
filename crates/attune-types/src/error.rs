use thiserror::Error;

/// Errors from repository operations (used by trait definitions in attune-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failure to decode a structured model response.
///
/// Never leaves attune-core: every decode site has a documented safe default,
/// and this error only exists so the fallback path can log what went wrong.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("structured payload did not match the expected shape: {0}")]
    Shape(String),

    #[error("raw text is not valid JSON: {0}")]
    Json(String),
}
