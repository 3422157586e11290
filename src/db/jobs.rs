//! Saved job description queries.

use crate::models::{new_id, now};
use crate::{Error, Result};
use aristosys_scoring::JobAnalysis;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

use super::{map_insert_error, DbPool};

/// Saved job description record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub jd_text: String,
    /// Cached analysis serialized as JSON.
    pub analysis_json: Option<String>,
    pub client_id: Option<String>,
    pub created_at: String,
}

impl JobDescription {
    /// Decode the cached analysis. A corrupt cache is treated as absent.
    pub fn analysis(&self) -> Option<JobAnalysis> {
        let raw = self.analysis_json.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(jd_id = %self.id, error = %e, "Ignoring unreadable stored JD analysis");
                None
            }
        }
    }
}

/// Input for saving a job description.
#[derive(Debug, Clone)]
pub struct CreateJobDescription {
    pub title: String,
    pub jd_text: String,
    pub analysis: Option<JobAnalysis>,
    pub client_id: Option<String>,
}

/// Save a job description.
pub async fn create_job_description(
    pool: &DbPool,
    input: CreateJobDescription,
) -> Result<JobDescription> {
    let analysis_json = input
        .analysis
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to encode JD analysis: {}", e)))?;

    sqlx::query_as::<_, JobDescription>(
        r#"
        INSERT INTO saved_jds (id, title, jd_text, analysis_json, client_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new_id())
    .bind(&input.title)
    .bind(&input.jd_text)
    .bind(&analysis_json)
    .bind(&input.client_id)
    .bind(now())
    .fetch_one(pool)
    .await
    .map_err(|e| map_insert_error(e, "Job description"))
}

/// Get a job description by ID.
pub async fn get_job_description(pool: &DbPool, id: &str) -> Result<JobDescription> {
    sqlx::query_as::<_, JobDescription>("SELECT * FROM saved_jds WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Job description".to_string()))
}

/// List saved job descriptions, newest first.
pub async fn list_job_descriptions(pool: &DbPool) -> Result<Vec<JobDescription>> {
    sqlx::query_as::<_, JobDescription>(
        "SELECT * FROM saved_jds ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// Delete a job description. Reports that used it keep their rows.
pub async fn delete_job_description(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM saved_jds WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Job description".to_string()));
    }

    Ok(())
}
