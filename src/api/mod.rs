//! API Routes for Aristosys
//!
//! This module combines all API routes into a single router.
//! Routes are organized by domain.

mod auth;
mod clients;
mod jobs;
mod screening;
pub mod status;

use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::{HeaderValue, StatusCode};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::services::Upload;
use crate::{AppState, Error, Result};

/// Build the complete API router.
///
/// Route structure:
/// - /, /health - Status (public)
/// - /api/auth/* - Signup and login via Supabase
/// - /clients/* - Client management
/// - /jobs/* - Saved job descriptions
/// - /screening/* - JD analysis, screening runs, transcription, reports
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .nest("/api/auth", auth::routes())
        .nest("/clients", clients::routes())
        .nest("/jobs", jobs::routes())
        .nest("/screening", screening::routes())
}

/// The full application: routes, state and HTTP layers.
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(server))
                .layer(DefaultBodyLimit::max(server.max_upload_size)),
        )
        .with_state(state)
}

/// CORS from configuration: any origin for `*`, otherwise the listed ones.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let Some(origins) = server.allowed_origins() else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// ============================================================================
// Multipart forms
// ============================================================================

/// A fully read multipart form: text fields and uploaded files by name.
#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<Upload>>,
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::FileTooLarge {
            max_size: crate::config().server.max_upload_size,
        }
    } else {
        Error::InvalidInput(format!("Failed to read multipart field: {}", err.body_text()))
    }
}

impl MultipartForm {
    /// Read every part of the request.
    ///
    /// Parts with a file name are uploads; empty file parts (a form submitted
    /// without choosing a file) are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());

            match filename {
                Some(filename) => {
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if filename.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_default().push(Upload {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Non-blank text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Boolean field; absent means `default`.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool> {
        match self.text(name) {
            None => Ok(default),
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(Error::Validation(format!(
                    "{} must be a boolean, got '{}'",
                    name, value
                ))),
            },
        }
    }

    /// First upload under `name`.
    pub fn file(&mut self, name: &str) -> Option<Upload> {
        self.files.get_mut(name).and_then(|files| {
            if files.is_empty() {
                None
            } else {
                Some(files.remove(0))
            }
        })
    }

    /// Every upload under `name`, in request order.
    pub fn files(&mut self, name: &str) -> Vec<Upload> {
        self.files.remove(name).unwrap_or_default()
    }
}
