//! Status Routes
//!
//! Routes:
//! - GET / - Service banner
//! - GET /health - Health check with dependency configuration

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::{db, AppState};

/// Build status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub environment: String,
    pub database: bool,
    pub auth_configured: bool,
    pub transcription_configured: bool,
    pub llm_available: bool,
    pub llm_providers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_last_error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
async fn root() -> Json<RootResponse> {
    let config = crate::config();
    Json(RootResponse {
        name: config.api.title.clone(),
        version: config.api.version.clone(),
        status: "running",
    })
}

/// GET /health
///
/// Degraded only when the database is unreachable; missing API keys are
/// reported but leave the service healthy.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = crate::config();

    let database = match db::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };

    let llm_last_error = state
        .llm
        .error_info()
        .await
        .map(|(message, failures)| format!("{} ({} consecutive failures)", message, failures));

    Json(HealthResponse {
        status: if database {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        version: config.api.version.clone(),
        environment: config.server.environment.clone(),
        database,
        auth_configured: state.auth.is_configured(),
        transcription_configured: config.transcription.api_key.is_some(),
        llm_available: state.llm.is_available().await,
        llm_providers: state.llm.providers(),
        llm_last_error,
    })
}
