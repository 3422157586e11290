//! Auth Routes
//!
//! Thin proxy to Supabase Auth.
//!
//! Routes:
//! - POST /api/auth/signup - Create an account
//! - POST /api/auth/login - Exchange email and password for a session token

use axum::{extract::State, routing::post, Json, Router};

use crate::services::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use crate::{AppState, Result};

/// Build auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>> {
    state.auth.signup(request).await.map(Json)
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    state.auth.login(request).await.map(Json)
}
