//! Client database queries.
//!
//! A client is the hiring company a recruiter screens for. Its evaluation
//! preferences are appended to model prompts.

use crate::models::{new_id, now};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;

// ============================================================================
// Types
// ============================================================================

/// Client record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub evaluation_preferences: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Client {
    /// Prompt addendum describing this client, when it has preferences.
    pub fn prompt_comments(&self) -> Option<String> {
        let prefs = self.evaluation_preferences.as_deref()?.trim();
        if prefs.is_empty() {
            return None;
        }
        Some(format!("CLIENT: {}\nPREFERENCES: {}", self.name, prefs))
    }
}

/// Input for creating a new client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub name: String,
    #[serde(default)]
    pub evaluation_preferences: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for updating a client. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub evaluation_preferences: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new client.
pub async fn create_client(pool: &DbPool, input: CreateClient) -> Result<Client> {
    let timestamp = now();

    sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (id, name, evaluation_preferences, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new_id())
    .bind(&input.name)
    .bind(&input.evaluation_preferences)
    .bind(&input.notes)
    .bind(&timestamp)
    .bind(&timestamp)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

/// Get a client by ID.
pub async fn get_client(pool: &DbPool, id: &str) -> Result<Client> {
    find_client(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound("Client".to_string()))
}

/// Get a client by ID, if it exists.
pub async fn find_client(pool: &DbPool, id: &str) -> Result<Option<Client>> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// List all clients, newest first.
pub async fn list_clients(pool: &DbPool) -> Result<Vec<Client>> {
    sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC, rowid DESC")
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// Update a client.
pub async fn update_client(pool: &DbPool, id: &str, input: UpdateClient) -> Result<Client> {
    let mut updates = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(name) = input.name {
        updates.push("name = ?");
        bindings.push(name);
    }
    if let Some(prefs) = input.evaluation_preferences {
        updates.push("evaluation_preferences = ?");
        bindings.push(prefs);
    }
    if let Some(notes) = input.notes {
        updates.push("notes = ?");
        bindings.push(notes);
    }

    if updates.is_empty() {
        return get_client(pool, id).await;
    }

    updates.push("updated_at = ?");
    bindings.push(now());

    let query = format!(
        "UPDATE clients SET {} WHERE id = ? RETURNING *",
        updates.join(", ")
    );

    let mut q = sqlx::query_as::<_, Client>(&query);
    for binding in &bindings {
        q = q.bind(binding);
    }
    q = q.bind(id);

    q.fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound("Client".to_string()))
}

/// Delete a client. Saved JDs and reports keep their rows with the
/// reference cleared.
pub async fn delete_client(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Client".to_string()));
    }

    Ok(())
}

/// Prompt comments for an optional client id.
///
/// Unknown ids and clients without preferences yield `None`.
pub async fn client_comments(pool: &DbPool, client_id: Option<&str>) -> Result<Option<String>> {
    let Some(id) = client_id.filter(|id| !id.is_empty()) else {
        return Ok(None);
    };
    Ok(find_client(pool, id)
        .await?
        .and_then(|client| client.prompt_comments()))
}
