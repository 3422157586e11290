//! Jobs Routes
//!
//! Saved job descriptions.
//!
//! Routes:
//! - GET /jobs - List saved job descriptions, newest first
//! - POST /jobs - Save a job description (multipart), optionally analysing it
//! - GET /jobs/:id - Get a saved job description
//! - DELETE /jobs/:id - Delete a saved job description
//! - POST /jobs/:id/analyze - Re-run the analysis without saving it

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::MultipartForm;
use crate::db::{self, CreateJobDescription};
use crate::models::{Deleted, JobAnalysis, JobDescriptionResponse};
use crate::services::documents::upload_or_text;
use crate::{AppState, Error, Result};

/// Placeholder title that asks for the analysed title instead.
const UNTITLED: &str = "Untitled";

/// Build job description routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/:id", get(get_job).delete(delete_job))
        .route("/:id/analyze", post(analyze_job))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub jd_id: String,
    pub analysis: JobAnalysis,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /jobs
async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobDescriptionResponse>>> {
    let jobs = db::list_job_descriptions(&state.db).await?;
    Ok(Json(jobs.into_iter().map(Into::into).collect()))
}

/// POST /jobs
///
/// Multipart fields: `title`, `jd_file` or `jd_text`, `client_id`, and
/// `analyze` (default true). A missing or "Untitled" title is replaced by
/// the analysed job title.
async fn create_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<JobDescriptionResponse>> {
    let mut form = MultipartForm::read(multipart).await?;
    let analyze = form.flag("analyze", true)?;
    let client_id = form.text("client_id");
    let mut title = form.text("title").unwrap_or_else(|| UNTITLED.to_string());

    let text = upload_or_text(form.file("jd_file"), form.text("jd_text"))
        .await?
        .ok_or_else(|| Error::InvalidInput("Provide jd_file or jd_text".to_string()))?;

    let analysis = if analyze {
        let comments = db::client_comments(&state.db, client_id.as_deref()).await?;
        let analysis = state.analysis.analyze_job(&text, comments.as_deref()).await;
        if title == UNTITLED {
            title = analysis.title_or("Untitled Position").to_string();
        }
        Some(analysis)
    } else {
        None
    };

    let saved = db::create_job_description(
        &state.db,
        CreateJobDescription {
            title,
            jd_text: text,
            analysis,
            client_id,
        },
    )
    .await?;

    info!(jd_id = %saved.id, title = %saved.title, analysed = analyze, "Job description saved");
    Ok(Json(saved.into()))
}

/// GET /jobs/:id
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDescriptionResponse>> {
    let job = db::get_job_description(&state.db, &id).await?;
    Ok(Json(job.into()))
}

/// DELETE /jobs/:id
async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    db::delete_job_description(&state.db, &id).await?;
    Ok(Json(Deleted::new("Job description deleted", id)))
}

/// POST /jobs/:id/analyze
///
/// The stored analysis is left untouched.
async fn analyze_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalyzeResponse>> {
    let job = db::get_job_description(&state.db, &id).await?;
    let comments = db::client_comments(&state.db, query.client_id.as_deref()).await?;
    let analysis = state.analysis.analyze_job(&job.jd_text, comments.as_deref()).await;

    Ok(Json(AnalyzeResponse {
        jd_id: job.id,
        analysis,
    }))
}
