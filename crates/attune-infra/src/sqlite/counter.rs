//! SQLite credential counter.
//!
//! One row per provider. The increment is a single upsert statement, so it
//! is atomic within a process (single-connection writer) and across
//! processes (SQLite write lock, WAL, busy timeout).

use attune_core::llm::rotation::CounterStore;
use attune_types::error::RepositoryError;

use super::pool::DatabasePool;

pub struct SqliteCounterStore {
    pool: DatabasePool,
}

impl SqliteCounterStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Current value without incrementing, 0 for an unseen provider.
    pub async fn current(&self, provider: &str) -> Result<u64, RepositoryError> {
        let value: Option<(i64,)> = sqlx::query_as("SELECT value FROM counters WHERE provider = ?")
            .bind(provider)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(value.map_or(0, |(v,)| v as u64))
    }
}

impl CounterStore for SqliteCounterStore {
    async fn increment(&self, provider: &str) -> Result<u64, RepositoryError> {
        let (value,): (i64,) = sqlx::query_as(
            r#"INSERT INTO counters (provider, value) VALUES (?, 1)
               ON CONFLICT (provider) DO UPDATE SET value = value + 1
               RETURNING value"#,
        )
        .bind(provider)
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(value as u64)
    }
}
