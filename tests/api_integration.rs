//! API Integration Tests for Aristosys
//!
//! Tests the REST API endpoints using axum-test.
//! Uses in-memory SQLite and fake model/transcription services.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use common::{build_test_app, build_test_app_with, FakeModel, RECOMMENDATION};
use serde_json::{json, Value};

fn text_file(name: &str, content: &str) -> Part {
    Part::bytes(content.as_bytes().to_vec())
        .file_name(name)
        .mime_type("text/plain")
}

fn audio_file(name: &str) -> Part {
    Part::bytes(vec![0u8; 64]).file_name(name).mime_type("audio/mpeg")
}

fn assert_error(body: &Value, code: &str) {
    assert_eq!(body["error"]["code"], code, "unexpected body: {}", body);
    assert!(body["error"]["message"].is_string());
}

async fn create_client(server: &TestServer, name: &str, preferences: Option<&str>) -> String {
    let response = server
        .post("/clients")
        .json(&json!({ "name": name, "evaluation_preferences": preferences }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

async fn save_job(server: &TestServer) -> String {
    let response = server
        .post("/jobs")
        .multipart(MultipartForm::new().add_text("jd_text", "We need a Rust backend engineer"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Status Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_root_reports_running() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "running");
    assert!(body["name"].is_string());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_check_without_providers() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
    assert_eq!(body["auth_configured"], false);
    assert_eq!(body["llm_available"], false);
    assert_eq!(body["llm_providers"], json!([]));
    assert!(body.get("llm_last_error").is_none());
}

// ============================================================================
// Auth Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_signup_rejects_invalid_email() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/api/auth/signup")
        .json(&json!({ "email": "not-an-email", "password": "secret123" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error(&response.json(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_auth_without_supabase_is_not_configured() {
    let (server, _pool, _model) = build_test_app().await;

    let signup = server
        .post("/api/auth/signup")
        .json(&json!({ "email": "jane@example.com", "password": "secret123" }))
        .await;
    signup.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&signup.json(), "NOT_CONFIGURED");

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": "jane@example.com", "password": "secret123" }))
        .await;
    login.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&login.json(), "NOT_CONFIGURED");
}

// ============================================================================
// Clients Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_client_lifecycle() {
    let (server, _pool, _model) = build_test_app().await;

    let id = create_client(&server, "  Acme  ", Some("Prefers startup experience")).await;

    let response = server.get(&format!("/clients/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["evaluation_preferences"], "Prefers startup experience");

    let response = server
        .put(&format!("/clients/{}", id))
        .json(&json!({ "notes": "Met at conference" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Acme");
    assert_eq!(body["notes"], "Met at conference");
    assert_eq!(body["evaluation_preferences"], "Prefers startup experience");

    let list: Value = server.get("/clients").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = server.delete(&format!("/clients/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Client deleted");
    assert_eq!(body["id"], id.as_str());

    let response = server.get(&format!("/clients/{}", id)).await;
    response.assert_status_not_found();
    assert_error(&response.json(), "NOT_FOUND");
}

#[tokio::test]
async fn test_client_name_is_required() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server.post("/clients").json(&json!({ "name": "   " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error(&response.json(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_unknown_client() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .put("/clients/missing")
        .json(&json!({ "name": "Globex" }))
        .await;
    response.assert_status_not_found();
}

// ============================================================================
// Jobs Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_create_job_uses_analysed_title() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/jobs")
        .multipart(
            MultipartForm::new()
                .add_text("title", "Untitled")
                .add_part("jd_file", text_file("jd.txt", "We need a Rust backend engineer")),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], "Backend Engineer");
    assert_eq!(body["content"], "We need a Rust backend engineer");
    assert_eq!(body["analysis"]["job_classification"], "strict_engineering");
    assert!(body["client_id"].is_null());
}

#[tokio::test]
async fn test_create_job_without_analysis_keeps_title() {
    let (server, _pool, model) = build_test_app().await;

    let response = server
        .post("/jobs")
        .multipart(
            MultipartForm::new()
                .add_text("title", "Platform Role")
                .add_text("jd_text", "Kubernetes and Go")
                .add_text("analyze", "false"),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], "Platform Role");
    assert!(body["analysis"].is_null());
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_create_job_requires_text() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/jobs")
        .multipart(MultipartForm::new().add_text("title", "Empty").add_text("jd_text", "  "))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_error(&body, "INVALID_INPUT");
    assert_eq!(body["error"]["message"], "Provide jd_file or jd_text");
}

#[tokio::test]
async fn test_create_job_rejects_bad_flag() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/jobs")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "Rust")
                .add_text("analyze", "maybe"),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error(&response.json(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_job_with_unknown_client_is_rejected() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/jobs")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "Rust")
                .add_text("client_id", "no-such-client"),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_error(&response.json(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_client_preferences_reach_the_prompt() {
    let (server, _pool, model) = build_test_app().await;
    let client_id = create_client(&server, "Acme", Some("Must have fintech background")).await;

    let response = server
        .post("/jobs")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "Rust payments engineer")
                .add_text("client_id", client_id.clone()),
        )
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["client_id"], client_id.as_str());

    let prompts = model.prompts_containing("analyzing a Job Description");
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("CLIENT: Acme\nPREFERENCES: Must have fintech background"));
}

#[tokio::test]
async fn test_job_get_list_and_delete() {
    let (server, _pool, _model) = build_test_app().await;
    let id = save_job(&server).await;

    let response = server.get(&format!("/jobs/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], id.as_str());

    let list: Value = server.get("/jobs").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = server.delete(&format!("/jobs/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Job description deleted");

    server
        .get(&format!("/jobs/{}", id))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/jobs/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_reanalyse_job_does_not_save() {
    let (server, _pool, model) = build_test_app().await;
    let id = save_job(&server).await;

    let response = server.post(&format!("/jobs/{}/analyze", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["jd_id"], id.as_str());
    assert_eq!(body["analysis"]["job_title"], "Backend Engineer");
    assert_eq!(model.prompts_containing("analyzing a Job Description").len(), 2);

    server
        .post("/jobs/missing/analyze")
        .await
        .assert_status_not_found();
}

// ============================================================================
// Screening Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_analyze_jd_saves_by_default() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/analyze-jd")
        .multipart(MultipartForm::new().add_text("jd_text", "Rust backend engineer"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["saved"], true);
    let jd_id = body["jd_id"].as_str().unwrap();

    let saved: Value = server.get(&format!("/jobs/{}", jd_id)).await.json();
    assert_eq!(saved["title"], "Backend Engineer");
}

#[tokio::test]
async fn test_analyze_jd_without_saving() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/analyze-jd")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "Rust backend engineer")
                .add_text("save_jd", "false"),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["saved"], false);
    assert!(body["jd_id"].is_null());
    assert_eq!(body["analysis"]["job_title"], "Backend Engineer");

    let list: Value = server.get("/jobs").await.json();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_screen_ranks_and_stores_report() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/screen")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "We need a Rust backend engineer")
                .add_part("resumes", text_file("John_Smith_Resume.txt", "John Smith\nSome Python"))
                .add_part("resumes", text_file("Jane_Doe_Resume.txt", "Jane Doe\nRust, PostgreSQL, Docker"))
                .add_part("audio_files", audio_file("John_Smith_Interview.mp3")),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["job_title"], "Backend Engineer");

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);

    let jane = &candidates[0];
    assert_eq!(jane["name"], "Jane Doe");
    assert_eq!(jane["resume_file"], "Jane_Doe_Resume.txt");
    assert!(jane["audio_file"].is_null());
    assert_eq!(jane["recommendation"], RECOMMENDATION);

    let john = &candidates[1];
    assert_eq!(john["name"], "john smith");
    assert_eq!(john["audio_file"], "John_Smith_Interview.mp3");
    assert_eq!(john["audio_analysis"]["technical_score"], 82);
    assert!(jane["resume_score"].as_f64().unwrap() > john["resume_score"].as_f64().unwrap());

    let report_html = body["report_html"].as_str().unwrap();
    assert!(report_html.contains("Jane Doe"));

    let report_id = body["report_id"].as_str().unwrap();
    let report: Value = server
        .get(&format!("/screening/reports/{}", report_id))
        .await
        .json();
    assert_eq!(report["job_title"], "Backend Engineer");
    assert!(report["jd_id"].is_null());
    assert_eq!(report["candidates"].as_array().unwrap().len(), 2);
    assert_eq!(report["report_html"], report_html);
}

#[tokio::test]
async fn test_screen_against_saved_job_reuses_analysis() {
    let (server, _pool, model) = build_test_app().await;
    let jd_id = save_job(&server).await;

    let response = server
        .post("/screening/screen")
        .multipart(
            MultipartForm::new()
                .add_text("jd_id", jd_id.clone())
                .add_part("resumes", text_file("jane_doe.md", "Jane Doe\nRust")),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(model.prompts_containing("analyzing a Job Description").len(), 1);

    let reports: Value = server
        .get("/screening/reports")
        .add_query_param("jd_id", &jd_id)
        .await
        .json();
    let reports = reports["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["jd_id"], jd_id.as_str());

    let other: Value = server
        .get("/screening/reports")
        .add_query_param("jd_id", "another-jd")
        .await
        .json();
    assert!(other["reports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_screen_with_client_applies_preferences() {
    let (server, _pool, model) = build_test_app().await;
    let client_id = create_client(&server, "Globex", Some("Values open source work")).await;

    let response = server
        .post("/screening/screen")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "Rust engineer")
                .add_text("client_id", client_id.clone())
                .add_part("resumes", text_file("jane.txt", "Jane Doe")),
        )
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    let resume_prompts = model.prompts_containing("evaluating a candidate's resume");
    assert_eq!(resume_prompts.len(), 1);
    assert!(resume_prompts[0].contains("PREFERENCES: Values open source work"));

    let report: Value = server
        .get(&format!("/screening/reports/{}", body["report_id"].as_str().unwrap()))
        .await
        .json();
    assert_eq!(report["client_id"], client_id.as_str());
}

#[tokio::test]
async fn test_screen_requires_a_job() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/screen")
        .multipart(MultipartForm::new().add_part("resumes", text_file("jane.txt", "Jane Doe")))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Provide jd_id or jd_file");
}

#[tokio::test]
async fn test_screen_unknown_saved_job() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/screen")
        .multipart(MultipartForm::new().add_text("jd_id", "missing"))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_screen_with_failing_model_still_completes() {
    let (server, _pool, _model) = build_test_app_with(FakeModel::with_job_reply("not json")).await;

    let response = server
        .post("/screening/screen")
        .multipart(
            MultipartForm::new()
                .add_text("jd_text", "Something")
                .add_part("resumes", text_file("jane.txt", "Jane Doe")),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["job_title"], "Technical Position");
    assert_eq!(body["candidates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transcribe_upload() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/transcribe")
        .multipart(MultipartForm::new().add_part("audio_file", audio_file("call.mp3")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["text"], "Interview of 64 bytes (audio/mpeg)");
    assert_eq!(body["duration"], 60.0);
}

#[tokio::test]
async fn test_transcribe_errors() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/transcribe")
        .multipart(MultipartForm::new().add_text("url", "https://example.com/call.mp3"))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_error(&response.json(), "TRANSCRIPTION_ERROR");

    let response = server
        .post("/screening/transcribe")
        .multipart(MultipartForm::new())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Provide audio_file or url");
}

#[tokio::test]
async fn test_reports_limit_and_not_found() {
    let (server, _pool, _model) = build_test_app().await;

    for _ in 0..3 {
        server
            .post("/screening/screen")
            .multipart(MultipartForm::new().add_text("jd_text", "Rust engineer"))
            .await
            .assert_status_ok();
    }

    let all: Value = server.get("/screening/reports").await.json();
    assert_eq!(all["reports"].as_array().unwrap().len(), 3);

    let limited: Value = server
        .get("/screening/reports")
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(limited["reports"].as_array().unwrap().len(), 2);

    let response = server.get("/screening/reports/missing").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["message"], "Report not found");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let (server, _pool, _model) = build_test_app().await;

    let response = server
        .post("/screening/transcribe")
        .multipart(
            MultipartForm::new()
                .add_part("audio_file", Part::bytes(vec![0u8; 2 * 1024 * 1024]).file_name("long.wav")),
        )
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_error(&response.json(), "FILE_TOO_LARGE");
}
