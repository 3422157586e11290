//! Speech-to-text for interview recordings via Deepgram's pre-recorded API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::TranscriptionConfig;
use crate::error::{Error, Result};

/// Transcribed recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub confidence: f64,
    /// Seconds of audio.
    pub duration: f64,
}

/// Anything that can turn a recording into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe raw audio bytes.
    async fn transcribe_bytes(&self, audio: Vec<u8>, content_type: &str) -> Result<Transcript>;

    /// Transcribe audio hosted at a URL.
    async fn transcribe_url(&self, url: &str) -> Result<Transcript>;
}

/// Deepgram REST client.
#[derive(Clone)]
pub struct DeepgramService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: ListenResults,
    #[serde(default)]
    metadata: Option<ListenMetadata>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ListenMetadata {
    #[serde(default)]
    duration: f64,
}

impl DeepgramService {
    /// Create a new Deepgram client.
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn listen_request(&self) -> Result<reqwest::RequestBuilder> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::NotConfigured("Deepgram".to_string()))?;

        Ok(self
            .client
            .post(format!("{}/listen", self.base_url))
            .header(header::AUTHORIZATION, format!("Token {}", api_key))
            .query(&[
                ("model", self.model.as_str()),
                ("language", "en"),
                ("smart_format", "true"),
                ("punctuate", "true"),
                ("diarize", "true"),
                ("paragraphs", "true"),
            ]))
    }

    async fn read_transcript(response: reqwest::Response) -> Result<Transcript> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Deepgram API error {}: {}",
                status, text
            )));
        }

        let body: ListenResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse response: {}", e)))?;

        let alternative = body
            .results
            .channels
            .into_iter()
            .next()
            .and_then(|c| c.alternatives.into_iter().next())
            .ok_or_else(|| Error::Transcription("Response contained no transcript".to_string()))?;

        Ok(Transcript {
            text: alternative.transcript,
            confidence: alternative.confidence,
            duration: body.metadata.map(|m| m.duration).unwrap_or(0.0),
        })
    }
}

#[async_trait]
impl Transcriber for DeepgramService {
    async fn transcribe_bytes(&self, audio: Vec<u8>, content_type: &str) -> Result<Transcript> {
        let size = audio.len();
        let response = self
            .listen_request()?
            .header(header::CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Request failed: {}", e)))?;

        let transcript = Self::read_transcript(response).await?;
        info!(
            bytes = size,
            duration = transcript.duration,
            "Recording transcribed"
        );
        Ok(transcript)
    }

    async fn transcribe_url(&self, url: &str) -> Result<Transcript> {
        debug!(url = %url, "Transcribing hosted recording");
        let response = self
            .listen_request()?
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Request failed: {}", e)))?;

        Self::read_transcript(response).await
    }
}
