//! SQLite profile repository.
//!
//! Attune only reads profiles while answering; `upsert` exists for the
//! `profile set` command and for seeding tests.

use attune_core::repository::profile::ProfileRepository;
use attune_types::error::RepositoryError;
use attune_types::profile::{Preferences, Profile};
use chrono::Utc;
use sqlx::Row;

use super::format_datetime;
use super::pool::DatabasePool;

pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the profile for `profile.owner_id`.
    pub async fn upsert(&self, profile: &Profile) -> Result<(), RepositoryError> {
        let goals = serde_json::to_string(&profile.goals)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let struggles = serde_json::to_string(&profile.struggles)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO profiles
                   (owner_id, goals, struggles, communication_style, reduce_overwhelm,
                    work_study_context, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT (owner_id) DO UPDATE SET
                   goals = excluded.goals,
                   struggles = excluded.struggles,
                   communication_style = excluded.communication_style,
                   reduce_overwhelm = excluded.reduce_overwhelm,
                   work_study_context = excluded.work_study_context,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&profile.owner_id)
        .bind(goals)
        .bind(struggles)
        .bind(&profile.preferences.communication_style)
        .bind(profile.preferences.reduce_overwhelm)
        .bind(&profile.work_study_context)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(owner_id = %profile.owner_id, "profile saved");
        Ok(())
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, RepositoryError> {
    let get_err = |e: sqlx::Error| RepositoryError::Query(e.to_string());
    let json_err = |e: serde_json::Error| RepositoryError::Query(format!("invalid profile list: {e}"));

    let goals: String = row.try_get("goals").map_err(get_err)?;
    let struggles: String = row.try_get("struggles").map_err(get_err)?;

    Ok(Profile {
        owner_id: row.try_get("owner_id").map_err(get_err)?,
        goals: serde_json::from_str(&goals).map_err(json_err)?,
        struggles: serde_json::from_str(&struggles).map_err(json_err)?,
        preferences: Preferences {
            communication_style: row.try_get("communication_style").map_err(get_err)?,
            reduce_overwhelm: row.try_get("reduce_overwhelm").map_err(get_err)?,
        },
        work_study_context: row.try_get("work_study_context").map_err(get_err)?,
    })
}

impl ProfileRepository for SqliteProfileRepository {
    async fn get(&self, owner_id: &str) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(row_to_profile).transpose()
    }
}
