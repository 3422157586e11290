//! Application state for Aristosys.
//!
//! Contains the shared state that is passed to all handlers.

use std::sync::Arc;

use aristosys_scoring::Scorer;

use crate::db::DbPool;
use crate::services::{
    AnalysisService, AuthService, Completer, DeepgramService, LlmService, ScreeningService,
    Transcriber,
};
use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// LLM client, kept for provider health reporting.
    pub llm: LlmService,
    /// Model-backed analysis.
    pub analysis: AnalysisService,
    /// Speech-to-text.
    pub transcriber: Arc<dyn Transcriber>,
    /// Supabase Auth proxy.
    pub auth: AuthService,
    /// Screening run orchestration.
    pub screening: ScreeningService,
}

impl AppState {
    /// Create a new application state, initializing all services.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        // Initialize database
        let db = crate::db::init_pool(&config.database.path).await?;

        // Initialize database schema
        crate::db::initialize_schema(&db).await?;

        let llm = LlmService::new(&config.llm)?;
        let transcriber = Arc::new(DeepgramService::new(&config.transcription)?);
        let auth = AuthService::new(&config.auth)?;

        Ok(Self::with_services(
            db,
            llm.clone(),
            Arc::new(llm),
            transcriber,
            auth,
            config.screening.concurrency,
        ))
    }

    /// Assemble state from already-built services.
    ///
    /// `completer` answers every model prompt; `llm` only reports provider
    /// health.
    pub fn with_services(
        db: DbPool,
        llm: LlmService,
        completer: Arc<dyn Completer>,
        transcriber: Arc<dyn Transcriber>,
        auth: AuthService,
        concurrency: usize,
    ) -> Self {
        let analysis = AnalysisService::new(completer);
        let screening = ScreeningService::new(
            db.clone(),
            analysis.clone(),
            transcriber.clone(),
            Scorer::new(),
            concurrency,
        );

        Self {
            db,
            llm,
            analysis,
            transcriber,
            auth,
            screening,
        }
    }
}
