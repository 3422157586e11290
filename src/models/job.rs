//! Saved job description responses.

use aristosys_scoring::JobAnalysis;
use serde::{Deserialize, Serialize};

use crate::db::JobDescription;

/// Saved job description as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptionResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub analysis: Option<JobAnalysis>,
    pub client_id: Option<String>,
    pub created_at: String,
}

impl From<JobDescription> for JobDescriptionResponse {
    fn from(jd: JobDescription) -> Self {
        let analysis = jd.analysis();
        Self {
            id: jd.id,
            title: jd.title,
            content: jd.jd_text,
            analysis,
            client_id: jd.client_id,
            created_at: jd.created_at,
        }
    }
}

/// Body of a `{message, id}` deletion acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
    pub id: String,
}

impl Deleted {
    pub fn new(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: id.into(),
        }
    }
}
