//! Clients Routes
//!
//! Hiring clients and their evaluation preferences.
//!
//! Routes:
//! - GET /clients - List clients, newest first
//! - POST /clients - Create a client
//! - GET /clients/:id - Get a client
//! - PUT /clients/:id - Update a client
//! - DELETE /clients/:id - Delete a client

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::db::{self, Client, CreateClient, UpdateClient};
use crate::models::Deleted;
use crate::{AppState, Error, Result};

/// Build client routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Client name is required".to_string()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /clients
async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>> {
    let clients = db::list_clients(&state.db).await?;
    Ok(Json(clients))
}

/// POST /clients
async fn create_client(
    State(state): State<AppState>,
    Json(mut input): Json<CreateClient>,
) -> Result<Json<Client>> {
    validate_name(&input.name)?;
    input.name = input.name.trim().to_string();

    let client = db::create_client(&state.db, input).await?;
    Ok(Json(client))
}

/// GET /clients/:id
async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Client>> {
    let client = db::get_client(&state.db, &id).await?;
    Ok(Json(client))
}

/// PUT /clients/:id
///
/// Only the fields present in the body change.
async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut input): Json<UpdateClient>,
) -> Result<Json<Client>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name)?;
        input.name = Some(name.trim().to_string());
    }

    let client = db::update_client(&state.db, &id, input).await?;
    Ok(Json(client))
}

/// DELETE /clients/:id
async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    db::delete_client(&state.db, &id).await?;
    Ok(Json(Deleted::new("Client deleted", id)))
}
