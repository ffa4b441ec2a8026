//! SQLite assessment repository.
//!
//! Answers and the explanation lists are stored as JSON text columns; the
//! scores are flattened into integer columns.

use attune_core::repository::assessment::AssessmentRepository;
use attune_types::assessment::{Answer, Assessment, AssessmentKind, Scores};
use attune_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

pub struct SqliteAssessmentRepository {
    pool: DatabasePool,
}

impl SqliteAssessmentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct AssessmentRow {
    id: String,
    owner_id: String,
    kind: String,
    answers: String,
    total: i64,
    inattention: Option<i64>,
    hyperactivity: Option<i64>,
    interpretation: Option<String>,
    traits: String,
    recommendations: String,
    questions_for_clinician: String,
    created_at: String,
}

impl AssessmentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            kind: row.try_get("kind")?,
            answers: row.try_get("answers")?,
            total: row.try_get("total")?,
            inattention: row.try_get("inattention")?,
            hyperactivity: row.try_get("hyperactivity")?,
            interpretation: row.try_get("interpretation")?,
            traits: row.try_get("traits")?,
            recommendations: row.try_get("recommendations")?,
            questions_for_clinician: row.try_get("questions_for_clinician")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_assessment(self) -> Result<Assessment, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid assessment id: {e}")))?;
        let kind: AssessmentKind = self.kind.parse().map_err(|e: String| RepositoryError::Query(e))?;
        let answers: Vec<Answer> = from_json(&self.answers, "answers")?;

        Ok(Assessment {
            id,
            owner_id: self.owner_id,
            kind,
            answers,
            scores: Scores {
                total: to_u32(self.total)?,
                inattention: self.inattention.map(to_u32).transpose()?,
                hyperactivity: self.hyperactivity.map(to_u32).transpose()?,
            },
            interpretation: self.interpretation,
            traits: from_json(&self.traits, "traits")?,
            recommendations: from_json(&self.recommendations, "recommendations")?,
            questions_for_clinician: from_json(
                &self.questions_for_clinician,
                "questions_for_clinician",
            )?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Query(format!("invalid {column}: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Query(e.to_string()))
}

fn to_u32(value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::Query(format!("score out of range: {value}")))
}

impl AssessmentRepository for SqliteAssessmentRepository {
    async fn insert(&self, assessment: &Assessment) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO assessments
                   (id, owner_id, kind, answers, total, inattention, hyperactivity,
                    interpretation, traits, recommendations, questions_for_clinician, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(assessment.id.to_string())
        .bind(&assessment.owner_id)
        .bind(assessment.kind.to_string())
        .bind(to_json(&assessment.answers)?)
        .bind(assessment.scores.total as i64)
        .bind(assessment.scores.inattention.map(i64::from))
        .bind(assessment.scores.hyperactivity.map(i64::from))
        .bind(&assessment.interpretation)
        .bind(to_json(&assessment.traits)?)
        .bind(to_json(&assessment.recommendations)?)
        .bind(to_json(&assessment.questions_for_clinician)?)
        .bind(format_datetime(&assessment.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("assessment {} already exists", assessment.id))
            }
            other => RepositoryError::Query(other.to_string()),
        })?;
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &Uuid) -> Result<Option<Assessment>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM assessments WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.map(|r| {
            AssessmentRow::from_row(&r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_assessment()
        })
        .transpose()
    }
}
