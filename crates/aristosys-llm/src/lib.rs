//! LLM completion client with multi-provider fallback.
//!
//! Supports the Anthropic Messages API and OpenAI-compatible chat completion
//! APIs. Providers are tried in priority order; each gets a couple of retries
//! on rate limits and transient failures before the next one is used.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Maximum attempts per provider before fallback
const MAX_RETRIES: u32 = 2;

/// Delay between retries (doubles each time)
const RETRY_DELAY_MS: u64 = 500;

/// Seconds to wait before trusting a failing service again
const HEALTH_CHECK_INTERVAL_SECS: u64 = 60;

/// Number of consecutive failures before reporting unavailable
const ERROR_THRESHOLD: u32 = 3;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Provider returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("No providers configured")]
    NoProviders,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid JSON in response: {0}")]
    InvalidJson(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Wire format spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    /// OpenAI and compatible APIs (OpenRouter, local gateways).
    OpenAi,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "anthropic" => Self::Anthropic,
            _ => Self::OpenAi,
        }
    }
}

/// Configuration for an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub priority: u8,
}

impl LlmProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        ProviderKind::from_name(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub providers: Vec<LlmProviderConfig>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            timeout_secs: 120,
        }
    }
}

/// Get default endpoint for a provider
pub fn default_endpoint(name: &str) -> String {
    match name {
        "anthropic" => "https://api.anthropic.com/v1".to_string(),
        "openrouter" => "https://openrouter.ai/api/v1".to_string(),
        _ => "https://api.openai.com/v1".to_string(),
    }
}

/// Get default model for a provider
pub fn default_model(name: &str) -> String {
    match name {
        "anthropic" => "claude-sonnet-4-20250514".to_string(),
        "openrouter" => "anthropic/claude-sonnet-4".to_string(),
        _ => "gpt-4o-mini".to_string(),
    }
}

/// Anything that can turn a prompt into text.
///
/// The application depends on this rather than on [`LlmService`] so that
/// completions can be scripted in tests.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Completion service with provider fallback.
#[derive(Clone)]
pub struct LlmService {
    inner: Arc<LlmServiceInner>,
}

struct LlmServiceInner {
    providers: Vec<LlmProviderConfig>,
    client: Client,
    /// Last error message from a failed completion
    last_error: RwLock<Option<String>>,
    /// When the last completion failed
    last_error_at: RwLock<Option<Instant>>,
    /// Consecutive failed completions
    error_count: AtomicU32,
}

/// Union of the Anthropic and OpenAI response shapes
#[derive(Debug, Deserialize)]
struct LlmResponse {
    choices: Option<Vec<Choice>>,
    content: Option<Vec<AnthropicContent>>,
    error: Option<LlmError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LlmError {
    message: String,
}

impl LlmService {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Request(format!("Failed to create HTTP client: {}", e)))?;

        let mut providers = config.providers.clone();
        providers.sort_by_key(|p| p.priority);

        info!(
            providers = ?providers.iter().map(|p| &p.name).collect::<Vec<_>>(),
            "LLM service initialized"
        );

        Ok(Self {
            inner: Arc::new(LlmServiceInner {
                providers,
                client,
                last_error: RwLock::new(None),
                last_error_at: RwLock::new(None),
                error_count: AtomicU32::new(0),
            }),
        })
    }

    /// Provider names in priority order
    pub fn providers(&self) -> Vec<String> {
        self.inner.providers.iter().map(|p| p.name.clone()).collect()
    }

    /// Whether completions are expected to work.
    ///
    /// False with no providers, or after repeated failures until the
    /// health-check interval has passed.
    pub async fn is_available(&self) -> bool {
        if self.inner.providers.is_empty() {
            return false;
        }

        if self.inner.error_count.load(Ordering::Relaxed) >= ERROR_THRESHOLD {
            if let Some(at) = *self.inner.last_error_at.read().await {
                return at.elapsed().as_secs() >= HEALTH_CHECK_INTERVAL_SECS;
            }
        }

        true
    }

    /// Last error message and consecutive failure count, if failing.
    pub async fn error_info(&self) -> Option<(String, u32)> {
        let error = self.inner.last_error.read().await;
        error
            .as_ref()
            .map(|msg| (msg.clone(), self.inner.error_count.load(Ordering::Relaxed)))
    }

    async fn record_error(&self, error: &str) {
        *self.inner.last_error.write().await = Some(error.to_string());
        *self.inner.last_error_at.write().await = Some(Instant::now());
        self.inner.error_count.fetch_add(1, Ordering::Relaxed);
    }

    async fn clear_error(&self) {
        *self.inner.last_error.write().await = None;
        self.inner.error_count.store(0, Ordering::Relaxed);
    }

    /// Complete a prompt with automatic provider fallback.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        if self.inner.providers.is_empty() {
            return Err(Error::NoProviders);
        }

        let mut last_error = None;

        for provider in &self.inner.providers {
            match self.try_provider(provider, prompt, max_tokens).await {
                Ok(response) => {
                    self.clear_error().await;
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        provider = %provider.name,
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| Error::Llm("All providers failed".to_string()));
        self.record_error(&error.to_string()).await;
        Err(error)
    }

    /// Try a specific provider with retries.
    async fn try_provider(
        &self,
        provider: &LlmProviderConfig,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let mut delay = Duration::from_millis(RETRY_DELAY_MS);
        let mut attempt = 0;

        loop {
            match self.call_provider(provider, prompt, max_tokens).await {
                Ok(response) => return Ok(response),
                Err(e) if Self::is_retryable(&e) && attempt + 1 < MAX_RETRIES => {
                    debug!(
                        provider = %provider.name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after error"
                    );
                    sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn is_retryable(error: &Error) -> bool {
        match error {
            Error::RateLimitExceeded | Error::Request(_) => true,
            Error::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    async fn call_provider(
        &self,
        provider: &LlmProviderConfig,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(
            provider = %provider.name,
            model = %provider.model,
            "Calling LLM provider"
        );

        let (url, body) = match provider.kind() {
            ProviderKind::Anthropic => build_anthropic_request(provider, prompt, max_tokens),
            ProviderKind::OpenAi => build_openai_request(provider, prompt, max_tokens),
        };

        let request = self
            .inner
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        let request = match provider.kind() {
            ProviderKind::Anthropic => request
                .header("x-api-key", &provider.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            ProviderKind::OpenAi => request.bearer_auth(&provider.api_key),
        };

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read response: {}", e)))?;

        if status.as_u16() == 429 {
            return Err(Error::RateLimitExceeded);
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_response(&provider.name, &text)
    }
}

#[async_trait]
impl Completer for LlmService {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        LlmService::complete(self, prompt, max_tokens).await
    }
}

fn build_anthropic_request(
    provider: &LlmProviderConfig,
    prompt: &str,
    max_tokens: u32,
) -> (String, Value) {
    let url = format!("{}/messages", provider.base_url.trim_end_matches('/'));

    let body = json!({
        "model": provider.model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "max_tokens": max_tokens,
        "temperature": 0.3
    });

    (url, body)
}

fn build_openai_request(
    provider: &LlmProviderConfig,
    prompt: &str,
    max_tokens: u32,
) -> (String, Value) {
    let url = format!("{}/chat/completions", provider.base_url.trim_end_matches('/'));

    let body = json!({
        "model": provider.model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "max_tokens": max_tokens,
        "temperature": 0.3
    });

    (url, body)
}

fn parse_response(provider: &str, text: &str) -> Result<String> {
    let response: LlmResponse = serde_json::from_str(text)
        .map_err(|e| Error::Llm(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(Error::Llm(error.message));
    }

    if let Some(content) = response.content {
        if let Some(text) = content
            .into_iter()
            .find(|block| block.content_type == "text")
            .and_then(|block| block.text)
        {
            return Ok(text);
        }
    }

    if let Some(choices) = response.choices {
        if let Some(choice) = choices.into_iter().next() {
            if let Some(message) = choice.message {
                return Ok(message.content);
            }
            if let Some(text) = choice.text {
                return Ok(text);
            }
        }
    }

    Err(Error::Llm(format!("No content in {} response", provider)))
}

/// Extract the JSON object from a model reply.
///
/// Strips a surrounding code fence, then parses everything from the first
/// `{` to the last `}`.
pub fn extract_json(text: &str) -> Result<Value> {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest).trim_start();
        text = text.strip_suffix("```").unwrap_or(text).trim_end();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&text[start..=end])
            .map_err(|e| Error::InvalidJson(e.to_string())),
        _ => Err(Error::InvalidJson("No valid JSON found in response".to_string())),
    }
}
