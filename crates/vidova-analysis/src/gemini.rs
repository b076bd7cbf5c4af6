//! Gemini client implementing [`AnalysisProvider`].
//!
//! Talks to the Generative Language API: file upload, file state
//! polling, and `generateContent` inference. The model is instructed to
//! answer with a strict two-valued JSON verdict; responses wrapped in
//! markdown code fences are unwrapped before parsing.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use vidova_models::Verdict;

use crate::error::{AnalysisError, AnalysisResult};
use crate::provider::{AnalysisProvider, IngestionState, MediaHandle};

/// Fixed instruction prompt requesting a strict two-valued verdict.
const CLASSIFICATION_PROMPT: &str = "Analyze this video for NSFW, violence, or sensitive content. \
    Determine if it is 'Safe' or 'Flagged'. Provide JSON output: \
    { \"sensitivity\": \"Safe\" | \"Flagged\", \"reason\": \"brief explanation\" }";

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Create config from environment variables. `GEMINI_API_KEY` is
    /// required; model and base URL have sensible defaults.
    pub fn from_env() -> AnalysisResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AnalysisError::config("GEMINI_API_KEY not set"))?;
        Ok(Self {
            api_key,
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
        })
    }
}

/// Gemini API client.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct FileEnvelope {
    file: FileResource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    uri: String,
    mime_type: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    FileData(FileData),
    Text(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiClient {
    /// Create a new Gemini client from explicit configuration.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> AnalysisResult<Self> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    async fn check_status(response: reqwest::Response) -> AnalysisResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(AnalysisError::provider(status, body))
    }
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    async fn upload_media(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> AnalysisResult<MediaHandle> {
        let url = format!(
            "{}/upload/v1beta/files?key={}",
            self.config.base_url, self.config.api_key
        );

        let bytes = tokio::fs::read(path).await?;
        let metadata = json!({ "file": { "display_name": display_name } }).to_string();
        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(metadata)
                    .mime_str("application/json")
                    .map_err(AnalysisError::Request)?,
            )
            .part(
                "file",
                multipart::Part::bytes(bytes)
                    .file_name(display_name.to_string())
                    .mime_str(mime_type)
                    .map_err(AnalysisError::Request)?,
            );

        let response = self.client.post(&url).multipart(form).send().await?;
        let envelope: FileEnvelope = Self::check_status(response).await?.json().await?;

        info!("Uploaded media to provider: {}", envelope.file.uri);
        Ok(MediaHandle {
            name: envelope.file.name,
            uri: envelope.file.uri,
            mime_type: envelope.file.mime_type,
        })
    }

    async fn ingestion_state(&self, handle: &MediaHandle) -> AnalysisResult<IngestionState> {
        let url = format!(
            "{}/v1beta/{}?key={}",
            self.config.base_url, handle.name, self.config.api_key
        );

        let response = self.client.get(&url).send().await?;
        let file: FileResource = Self::check_status(response).await?.json().await?;

        let state = file.state.as_deref().unwrap_or("ACTIVE");
        debug!("Media {} state: {state}", handle.name);
        Ok(IngestionState::from_provider(state))
    }

    async fn classify(&self, handle: &MediaHandle) -> AnalysisResult<Verdict> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::FileData(FileData {
                        mime_type: handle.mime_type.clone(),
                        file_uri: handle.uri.clone(),
                    }),
                    Part::Text(CLASSIFICATION_PROMPT.to_string()),
                ],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let body: GenerateResponse = Self::check_status(response).await?.json().await?;

        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or(AnalysisError::EmptyResponse)?;

        parse_verdict(text)
    }
}

/// Parse the model's textual response as a verdict, unwrapping markdown
/// code fences when present.
pub fn parse_verdict(text: &str) -> AnalysisResult<Verdict> {
    let text = strip_code_fences(text);
    let verdict: Verdict = serde_json::from_str(text)
        .map_err(|e| AnalysisError::parse(format!("{e}: {text}")))?;
    if !verdict.is_valid() {
        return Err(AnalysisError::parse(format!(
            "sensitivity must be Safe or Flagged, got {}",
            verdict.sensitivity
        )));
    }
    Ok(verdict)
}

/// Strip a leading/trailing triple-backtick fence (with optional `json`
/// tag). A no-op for unfenced text.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}
