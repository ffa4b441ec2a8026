//! SQLite memory repository implementation.
//!
//! Implements `MemoryRepository` from `attune-core` using sqlx with split
//! read/write pools. Embeddings are stored as little-endian `f32` blobs.

use attune_core::memory::store::MemoryRepository;
use attune_types::error::RepositoryError;
use attune_types::memory::{MemoryRecord, SourceType};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MemoryRepository`.
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain MemoryRecord.
struct MemoryRow {
    id: String,
    owner_id: String,
    text: String,
    source_type: String,
    source_id: String,
    embedding: Option<Vec<u8>>,
    created_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            text: row.try_get("text")?,
            source_type: row.try_get("source_type")?,
            source_id: row.try_get("source_id")?,
            embedding: row.try_get("embedding")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<MemoryRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid memory id: {e}")))?;
        let source_type: SourceType = self
            .source_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let embedding = self.embedding.as_deref().map(decode_embedding).transpose()?;

        Ok(MemoryRecord {
            id,
            owner_id: self.owner_id,
            text: self.text,
            source_type,
            source_id: self.source_id,
            embedding,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, RepositoryError> {
    if bytes.len() % 4 != 0 {
        return Err(RepositoryError::Query(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

impl MemoryRepository for SqliteMemoryRepository {
    async fn insert(&self, record: &MemoryRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO memories (id, owner_id, text, source_type, source_id, embedding, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(&record.owner_id)
        .bind(&record.text)
        .bind(record.source_type.to_string())
        .bind(&record.source_id)
        .bind(record.embedding.as_deref().map(encode_embedding))
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn recent_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
    ) -> Result<Vec<MemoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, owner_id, text, source_type, source_id, embedding, created_at
               FROM memories
               WHERE owner_id = ?
               ORDER BY created_at DESC, id DESC
               LIMIT ?"#,
        )
        .bind(owner_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                MemoryRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_record()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_record(owner: &str, text: &str, age_secs: i64) -> MemoryRecord {
        MemoryRecord {
            id: Uuid::now_v7(),
            owner_id: owner.to_string(),
            text: text.to_string(),
            source_type: SourceType::Chat,
            source_id: "thread-1".to_string(),
            embedding: Some(vec![0.25, -1.5, 3.0]),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back_embedding() {
        let repo = SqliteMemoryRepository::new(test_pool().await);
        let record = make_record("u1", "likes lists", 0);
        repo.insert(&record).await.unwrap();

        let found = repo.recent_for_owner("u1", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, record.id);
        assert_eq!(found[0].embedding.as_deref(), Some(&[0.25, -1.5, 3.0][..]));
        assert_eq!(found[0].source_type, SourceType::Chat);
    }

    #[tokio::test]
    async fn test_missing_embedding_round_trips_as_none() {
        let repo = SqliteMemoryRepository::new(test_pool().await);
        let mut record = make_record("u1", "legacy", 0);
        record.embedding = None;
        repo.insert(&record).await.unwrap();

        let found = repo.recent_for_owner("u1", 10).await.unwrap();
        assert!(found[0].embedding.is_none());
    }

    #[tokio::test]
    async fn test_recent_is_owner_scoped_newest_first_and_limited() {
        let repo = SqliteMemoryRepository::new(test_pool().await);
        repo.insert(&make_record("u1", "oldest", 30)).await.unwrap();
        repo.insert(&make_record("u1", "newest", 1)).await.unwrap();
        repo.insert(&make_record("u1", "middle", 10)).await.unwrap();
        repo.insert(&make_record("u2", "other owner", 0)).await.unwrap();

        let found = repo.recent_for_owner("u1", 2).await.unwrap();
        let texts: Vec<&str> = found.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["newest", "middle"]);

        assert!(repo.recent_for_owner("nobody", 5).await.unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        assert!(decode_embedding(&[0, 0, 128]).is_err());
        assert_eq!(decode_embedding(&encode_embedding(&[1.0, 2.0])).unwrap(), vec![1.0, 2.0]);
    }
}
