//! SQLite conversation thread repository.
//!
//! Messages live in `thread_messages` keyed by a per-thread sequence number.
//! An append runs in one write transaction that upserts the thread row
//! first, so the sequence read that follows already holds the write lock.

use attune_core::chat::repository::ThreadRepository;
use attune_types::chat::{ConversationThread, ThreadMessage, ThreadRole};
use attune_types::error::RepositoryError;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

pub struct SqliteThreadRepository {
    pool: DatabasePool,
}

impl SqliteThreadRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ThreadMessage, RepositoryError> {
        let role: ThreadRole = self.role.parse().map_err(|e: String| RepositoryError::Query(e))?;
        Ok(ThreadMessage {
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl ThreadRepository for SqliteThreadRepository {
    async fn append(
        &self,
        owner_id: &str,
        thread_id: &str,
        messages: &[ThreadMessage],
    ) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query(
            r#"INSERT INTO threads (owner_id, thread_id, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (owner_id, thread_id) DO UPDATE SET updated_at = excluded.updated_at"#,
        )
        .bind(owner_id)
        .bind(thread_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        let (next_seq,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM thread_messages WHERE owner_id = ? AND thread_id = ?",
        )
        .bind(owner_id)
        .bind(thread_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(query_err)?;

        for (offset, message) in messages.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO thread_messages (owner_id, thread_id, seq, role, content, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(owner_id)
            .bind(thread_id)
            .bind(next_seq + offset as i64)
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(format_datetime(&message.created_at))
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        }

        tx.commit().await.map_err(query_err)?;
        tracing::debug!(thread_id, appended = messages.len(), "appended thread messages");
        Ok(())
    }

    async fn get_thread(
        &self,
        owner_id: &str,
        thread_id: &str,
    ) -> Result<Option<ConversationThread>, RepositoryError> {
        let header = sqlx::query(
            "SELECT created_at, updated_at FROM threads WHERE owner_id = ? AND thread_id = ?",
        )
        .bind(owner_id)
        .bind(thread_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let Some(header) = header else {
            return Ok(None);
        };
        let created_at: String = header.try_get("created_at").map_err(query_err)?;
        let updated_at: String = header.try_get("updated_at").map_err(query_err)?;

        let rows = sqlx::query(
            r#"SELECT role, content, created_at FROM thread_messages
               WHERE owner_id = ? AND thread_id = ?
               ORDER BY seq ASC"#,
        )
        .bind(owner_id)
        .bind(thread_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let messages = rows
            .iter()
            .map(|row| MessageRow::from_row(row).map_err(query_err)?.into_message())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ConversationThread {
            owner_id: owner_id.to_string(),
            thread_id: thread_id.to_string(),
            messages,
            created_at: parse_datetime(&created_at)?,
            updated_at: parse_datetime(&updated_at)?,
        }))
    }
}
