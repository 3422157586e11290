//! Screening Routes
//!
//! Routes:
//! - POST /screening/analyze-jd - Analyse a job description, optionally saving it
//! - POST /screening/screen - Screen resumes and interview recordings against a JD
//! - POST /screening/transcribe - Transcribe one recording
//! - GET /screening/reports - List stored screening reports
//! - GET /screening/reports/:id - Get a stored screening report

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::MultipartForm;
use crate::db::{self, CreateJobDescription};
use crate::models::{JobAnalysis, ReportResponse, ScreeningResponse};
use crate::services::documents::upload_or_text;
use crate::services::{ScreeningRequest, Transcript};
use crate::{AppState, Error, Result};

/// Build screening routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-jd", post(analyze_jd))
        .route("/screen", post(screen))
        .route("/transcribe", post(transcribe))
        .route("/reports", get(list_reports))
        .route("/reports/:id", get(get_report))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AnalyzeJdResponse {
    pub jd_id: Option<String>,
    pub analysis: JobAnalysis,
    pub saved: bool,
}

/// Query parameters for listing reports.
#[derive(Debug, Default, Deserialize)]
pub struct ListReportsQuery {
    /// Defaults to 50, capped at 500
    pub limit: Option<i64>,
    /// Only reports screened against this saved JD
    pub jd_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportList {
    pub reports: Vec<ReportResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /screening/analyze-jd
///
/// Multipart fields: `jd_file` or `jd_text`, `client_id`, `save_jd`
/// (default true).
async fn analyze_jd(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeJdResponse>> {
    let mut form = MultipartForm::read(multipart).await?;
    let save_jd = form.flag("save_jd", true)?;
    let client_id = form.text("client_id");

    let text = upload_or_text(form.file("jd_file"), form.text("jd_text"))
        .await?
        .ok_or_else(|| Error::InvalidInput("Provide jd_file or jd_text".to_string()))?;

    let comments = db::client_comments(&state.db, client_id.as_deref()).await?;
    let analysis = state.analysis.analyze_job(&text, comments.as_deref()).await;

    let jd_id = if save_jd {
        let saved = db::create_job_description(
            &state.db,
            CreateJobDescription {
                title: analysis.title_or("Untitled Position").to_string(),
                jd_text: text,
                analysis: Some(analysis.clone()),
                client_id,
            },
        )
        .await?;
        info!(jd_id = %saved.id, "Analysed job description saved");
        Some(saved.id)
    } else {
        None
    };

    Ok(Json(AnalyzeJdResponse {
        jd_id,
        analysis,
        saved: save_jd,
    }))
}

/// POST /screening/screen
///
/// Multipart fields: `jd_id` or `jd_file` or `jd_text`, `client_id`, and any
/// number of `resumes` and `audio_files` uploads.
async fn screen(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScreeningResponse>> {
    let mut form = MultipartForm::read(multipart).await?;

    let request = ScreeningRequest {
        jd_id: form.text("jd_id"),
        jd_file: form.file("jd_file"),
        jd_text: form.text("jd_text"),
        client_id: form.text("client_id"),
        resumes: form.files("resumes"),
        audio_files: form.files("audio_files"),
    };

    let response = state.screening.screen(request).await?;
    Ok(Json(response))
}

/// POST /screening/transcribe
///
/// Multipart fields: an `audio_file` upload, or a `url` to fetch.
async fn transcribe(State(state): State<AppState>, multipart: Multipart) -> Result<Json<Transcript>> {
    let mut form = MultipartForm::read(multipart).await?;

    let transcript = if let Some(recording) = form.file("audio_file") {
        let content_type = recording.mime_type();
        state
            .transcriber
            .transcribe_bytes(recording.bytes, &content_type)
            .await?
    } else if let Some(url) = form.text("url") {
        state.transcriber.transcribe_url(&url).await?
    } else {
        return Err(Error::InvalidInput("Provide audio_file or url".to_string()));
    };

    Ok(Json(transcript))
}

/// GET /screening/reports
async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListReportsQuery>,
) -> Result<Json<ReportList>> {
    let reports =
        db::list_screening_reports(&state.db, query.jd_id.as_deref(), query.limit).await?;

    Ok(Json(ReportList {
        reports: reports.into_iter().map(Into::into).collect(),
    }))
}

/// GET /screening/reports/:id
async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>> {
    let report = db::get_screening_report(&state.db, &id).await?;
    Ok(Json(report.into()))
}
