//! Screening report queries.

use crate::models::{new_id, now};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{map_insert_error, DbPool};

/// Default number of reports returned by a listing.
pub const DEFAULT_REPORT_LIMIT: i64 = 50;
/// Upper bound for a listing.
pub const MAX_REPORT_LIMIT: i64 = 500;

/// Screening report record.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub id: String,
    pub jd_id: Option<String>,
    pub job_title: String,
    /// Ranked candidate results serialized as JSON.
    pub candidates_json: String,
    pub report_html: String,
    pub client_id: Option<String>,
    pub created_at: String,
}

impl ScreeningReport {
    /// Decode the stored candidate list.
    pub fn candidates(&self) -> Value {
        serde_json::from_str(&self.candidates_json).unwrap_or(Value::Array(Vec::new()))
    }
}

/// Input for saving a screening report.
#[derive(Debug, Clone)]
pub struct CreateScreeningReport {
    pub jd_id: Option<String>,
    pub job_title: String,
    pub candidates: Value,
    pub report_html: String,
    pub client_id: Option<String>,
}

/// Clamp a requested listing size.
pub fn clamp_report_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_REPORT_LIMIT)
        .clamp(1, MAX_REPORT_LIMIT)
}

/// Save a screening report.
pub async fn create_screening_report(
    pool: &DbPool,
    input: CreateScreeningReport,
) -> Result<ScreeningReport> {
    sqlx::query_as::<_, ScreeningReport>(
        r#"
        INSERT INTO screening_reports
            (id, jd_id, job_title, candidates_json, report_html, client_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new_id())
    .bind(&input.jd_id)
    .bind(&input.job_title)
    .bind(input.candidates.to_string())
    .bind(&input.report_html)
    .bind(&input.client_id)
    .bind(now())
    .fetch_one(pool)
    .await
    .map_err(|e| map_insert_error(e, "Screening report"))
}

/// Get a screening report by ID.
pub async fn get_screening_report(pool: &DbPool, id: &str) -> Result<ScreeningReport> {
    sqlx::query_as::<_, ScreeningReport>("SELECT * FROM screening_reports WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Report".to_string()))
}

/// List screening reports, newest first, optionally for one saved JD.
pub async fn list_screening_reports(
    pool: &DbPool,
    jd_id: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<ScreeningReport>> {
    let limit = clamp_report_limit(limit);

    match jd_id {
        Some(jd_id) => sqlx::query_as::<_, ScreeningReport>(
            r#"
            SELECT * FROM screening_reports
            WHERE jd_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(jd_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Error::Database),
        None => sqlx::query_as::<_, ScreeningReport>(
            r#"
            SELECT * FROM screening_reports
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Error::Database),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_job_description, setup_test_db, CreateJobDescription};
    use serde_json::json;

    fn report(jd_id: Option<String>, title: &str) -> CreateScreeningReport {
        CreateScreeningReport {
            jd_id,
            job_title: title.to_string(),
            candidates: json!([{"name": "Jane Doe", "resume_score": 81.5}]),
            report_html: "<html></html>".to_string(),
            client_id: None,
        }
    }

    #[test]
    fn test_clamp_report_limit() {
        assert_eq!(clamp_report_limit(None), 50);
        assert_eq!(clamp_report_limit(Some(0)), 1);
        assert_eq!(clamp_report_limit(Some(-5)), 1);
        assert_eq!(clamp_report_limit(Some(10_000)), 500);
        assert_eq!(clamp_report_limit(Some(20)), 20);
    }

    #[tokio::test]
    async fn test_create_and_get_report() {
        let pool = setup_test_db().await;

        let saved = create_screening_report(&pool, report(None, "Backend Engineer"))
            .await
            .unwrap();
        let fetched = get_screening_report(&pool, &saved.id).await.unwrap();

        assert_eq!(fetched.job_title, "Backend Engineer");
        assert_eq!(fetched.candidates()[0]["name"], "Jane Doe");
        assert!(matches!(
            get_screening_report(&pool, "missing").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_reports_filtered_and_limited() {
        let pool = setup_test_db().await;
        let jd = create_job_description(&pool, CreateJobDescription {
            title: "Backend Engineer".to_string(),
            jd_text: "Rust".to_string(),
            analysis: None,
            client_id: None,
        }).await.unwrap();

        create_screening_report(&pool, report(Some(jd.id.clone()), "A")).await.unwrap();
        create_screening_report(&pool, report(None, "B")).await.unwrap();
        create_screening_report(&pool, report(Some(jd.id.clone()), "C")).await.unwrap();

        let all = list_screening_reports(&pool, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].job_title, "C");

        let for_jd = list_screening_reports(&pool, Some(&jd.id), None).await.unwrap();
        let titles: Vec<&str> = for_jd.iter().map(|r| r.job_title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A"]);

        let limited = list_screening_reports(&pool, None, Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_jd_is_rejected() {
        let pool = setup_test_db().await;

        let result = create_screening_report(&pool, report(Some("ghost".to_string()), "A")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
