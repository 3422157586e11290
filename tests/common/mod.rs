//! Shared helpers for the HTTP integration tests.
//!
//! Builds the full router over an in-memory SQLite database with a fake
//! model and a fake transcriber in place of the hosted services.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use aristosys::config::{AuthConfig, ServerConfig};
use aristosys::db::{self, DbPool};
use aristosys::services::{AuthService, Completer, LlmService, Transcriber, Transcript};
use aristosys::{api, AppState, Error, Result};
use aristosys_llm::LlmConfig;
use async_trait::async_trait;
use axum_test::TestServer;

pub const JOB_ANALYSIS: &str = r#"{
    "job_title": "Backend Engineer",
    "job_classification": "strict_engineering",
    "must_have_skills": ["Rust", {"skill": "Database", "type": "or_group", "options": ["PostgreSQL", "MySQL"]}],
    "nice_to_have_skills": ["Docker"],
    "total_experience_required": 3
}"#;

pub const STRONG_RESUME: &str = r#"{
    "candidate_name": "Jane Doe",
    "estimated_total_experience": 6,
    "skill_strength": {"Rust": "strong", "PostgreSQL": "strong", "Docker": "moderate"},
    "support_hybrid_pattern": "engineering_heavy",
    "engineering_depth_score": 14,
    "formatting_score": 5,
    "summary": "Seasoned Rust backend engineer"
}"#;

pub const WEAK_RESUME: &str = r#"{
    "candidate_name": "Unknown",
    "estimated_total_experience": 1,
    "skill_strength": {"Rust": "none", "PostgreSQL": "weak"},
    "engineering_depth_score": 3,
    "formatting_score": 2,
    "summary": "Junior profile"
}"#;

pub const INTERVIEW: &str = r#"{
    "technical_score": 82,
    "communication_score": 74,
    "skills_demonstrated": ["Rust"],
    "technical_notes": "Explained ownership clearly",
    "communication_notes": "Concise",
    "red_flags": [],
    "green_flags": ["Hands-on"]
}"#;

pub const RECOMMENDATION: &str = "Proceed to the technical round.";

/// Model double answering each prompt kind with canned text.
///
/// Resumes mentioning "Jane Doe" get [`STRONG_RESUME`], all others
/// [`WEAK_RESUME`]. Every prompt is recorded.
pub struct FakeModel {
    prompts: Mutex<Vec<String>>,
    job_reply: String,
}

impl FakeModel {
    pub fn new() -> Arc<Self> {
        Self::with_job_reply(JOB_ANALYSIS)
    }

    pub fn with_job_reply(job_reply: &str) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            job_reply: job_reply.to_string(),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn prompts_containing(&self, needle: &str) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| p.contains(needle))
            .collect()
    }
}

#[async_trait]
impl Completer for FakeModel {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> aristosys_llm::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let reply = if prompt.contains("analyzing a Job Description") {
            self.job_reply.clone()
        } else if prompt.contains("evaluating a candidate's resume") {
            if prompt.contains("Jane Doe") {
                STRONG_RESUME.to_string()
            } else {
                WEAK_RESUME.to_string()
            }
        } else if prompt.contains("evaluating an interview transcript") {
            INTERVIEW.to_string()
        } else if prompt.contains("hiring recommendation") {
            RECOMMENDATION.to_string()
        } else {
            return Err(aristosys_llm::Error::Llm("unexpected prompt".to_string()));
        };
        Ok(reply)
    }
}

/// Transcriber double: echoes the byte count, fails for URLs.
pub struct FakeTranscriber;

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe_bytes(&self, audio: Vec<u8>, content_type: &str) -> Result<Transcript> {
        Ok(Transcript {
            text: format!("Interview of {} bytes ({})", audio.len(), content_type),
            confidence: 0.9,
            duration: 60.0,
        })
    }

    async fn transcribe_url(&self, url: &str) -> Result<Transcript> {
        Err(Error::Transcription(format!("cannot fetch {}", url)))
    }
}

pub fn server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: "*".to_string(),
        max_upload_size: 1024 * 1024,
        environment: "test".to_string(),
    }
}

/// Create a test database with the schema applied
pub async fn setup_test_db() -> DbPool {
    let pool = db::init_pool(":memory:")
        .await
        .expect("Failed to create test database");
    db::initialize_schema(&pool)
        .await
        .expect("Failed to initialize schema");
    pool
}

/// State with no LLM providers, no Supabase and the given doubles.
pub fn build_test_state(pool: DbPool, model: Arc<FakeModel>) -> AppState {
    let llm = LlmService::new(&LlmConfig {
        providers: vec![],
        timeout_secs: 5,
    })
    .expect("Failed to create LLM service");

    let auth = AuthService::new(&AuthConfig {
        supabase_url: None,
        supabase_anon_key: None,
    })
    .expect("Failed to create auth service");

    AppState::with_services(pool, llm, model, Arc::new(FakeTranscriber), auth, 2)
}

/// Build a test server with the full API and HTTP layers.
pub async fn build_test_app() -> (TestServer, DbPool, Arc<FakeModel>) {
    build_test_app_with(FakeModel::new()).await
}

pub async fn build_test_app_with(model: Arc<FakeModel>) -> (TestServer, DbPool, Arc<FakeModel>) {
    let pool = setup_test_db().await;
    let state = build_test_state(pool.clone(), model.clone());
    let app = api::app(state, &server_config());
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, pool, model)
}
