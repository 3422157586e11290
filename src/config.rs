//! Configuration management for Aristosys.
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Secrets are optional: a missing key disables the feature that
//! needs it instead of stopping the server.

use std::env;
use std::sync::OnceLock;

use aristosys_llm::{default_endpoint, default_model, LlmConfig, LlmProviderConfig};

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub transcription: TranscriptionConfig,
    pub auth: AuthConfig,
    pub screening: ScreeningConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated allowed origins, or `*`.
    pub cors_origins: String,
    /// Maximum request body size in bytes (uploads included).
    pub max_upload_size: usize,
    pub environment: String,
}

impl ServerConfig {
    /// Allowed CORS origins; `None` means any origin.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins = self.cors_origins.trim();
        if origins == "*" || origins.is_empty() {
            return None;
        }
        Some(
            origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

impl AuthConfig {
    pub fn is_configured(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ScreeningConfig {
    /// Candidates processed in parallel during a screening run.
    pub concurrency: usize,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "8000").parse().unwrap_or(8000),
                cors_origins: env_or("CORS_ORIGINS", "*"),
                max_upload_size: env_or("MAX_UPLOAD_SIZE", "52428800")
                    .parse()
                    .unwrap_or(50 * 1024 * 1024), // 50MB
                environment: env_or("ENVIRONMENT", "development"),
            },
            api: ApiConfig {
                title: env_or("API_TITLE", "Aristosys API"),
                version: env_or("API_VERSION", env!("CARGO_PKG_VERSION")),
                description: env_or(
                    "API_DESCRIPTION",
                    "AI-Powered Recruitment Screening Platform",
                ),
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", "./data/aristosys.db"),
            },
            llm: LlmConfig {
                providers: Self::parse_llm_providers(),
                timeout_secs: env_or("LLM_TIMEOUT_SECS", "120").parse().unwrap_or(120),
            },
            transcription: TranscriptionConfig {
                api_key: non_empty_var("DEEPGRAM_API_KEY"),
                base_url: env_or("DEEPGRAM_URL", "https://api.deepgram.com/v1"),
                model: env_or("DEEPGRAM_MODEL", "nova-2"),
            },
            auth: AuthConfig {
                supabase_url: non_empty_var("SUPABASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string()),
                supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY")
                    .or_else(|| non_empty_var("SUPABASE_KEY")),
            },
            screening: ScreeningConfig {
                concurrency: env_or("SCREENING_CONCURRENCY", "4")
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .unwrap_or(4),
            },
        }
    }

    /// Parse LLM providers from environment.
    /// Anthropic is preferred; an OpenAI-compatible provider is the fallback.
    fn parse_llm_providers() -> Vec<LlmProviderConfig> {
        let mut providers = Vec::new();

        if let Some(api_key) = non_empty_var("ANTHROPIC_API_KEY") {
            providers.push(LlmProviderConfig {
                name: "anthropic".to_string(),
                base_url: env_or("ANTHROPIC_BASE_URL", &default_endpoint("anthropic")),
                model: env_or("ANTHROPIC_MODEL", &default_model("anthropic")),
                api_key,
                priority: 1,
            });
        }

        if let Some(api_key) = non_empty_var("OPENAI_API_KEY") {
            providers.push(LlmProviderConfig {
                name: "openai".to_string(),
                base_url: env_or("OPENAI_BASE_URL", &default_endpoint("openai")),
                model: env_or("OPENAI_MODEL", &default_model("openai")),
                api_key,
                priority: 2,
            });
        }

        providers.sort_by_key(|p| p.priority);
        providers
    }

    /// Names of unset settings that disable a feature, for start-up warnings.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm.providers.is_empty() {
            missing.push("ANTHROPIC_API_KEY");
        }
        if self.transcription.api_key.is_none() {
            missing.push("DEEPGRAM_API_KEY");
        }
        if self.auth.supabase_url.is_none() {
            missing.push("SUPABASE_URL");
        }
        if self.auth.supabase_anon_key.is_none() {
            missing.push("SUPABASE_ANON_KEY");
        }
        missing
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
