//! Split reader/writer SQLite pools.
//!
//! SQLite serializes writers, so every write (counter increments, thread
//! appends, memory inserts) goes through a one-connection writer pool while
//! reads fan out over a small read-only pool. WAL lets the two coexist, and
//! the busy timeout covers a second `attune` process holding the write lock.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

const DATABASE_FILE: &str = "attune.db";
const READER_CONNECTIONS: u32 = 8;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) `{data_dir}/attune.db`.
    pub async fn open(data_dir: &Path) -> Result<Self, sqlx::Error> {
        Self::new(&database_url(data_dir)).await
    }

    /// Connect both pools to `database_url` and apply pending migrations.
    ///
    /// Migrations run on the writer before the reader opens, so read-only
    /// connections never observe a half-built schema.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.clone())
            .await?;
        sqlx::migrate!("../../migrations").run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(READER_CONNECTIONS)
            .connect_with(options.read_only(true))
            .await?;

        tracing::debug!(database_url, "database pools ready");
        Ok(Self { reader, writer })
    }
}

fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display())
}
