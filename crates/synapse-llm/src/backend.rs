//! LLM backend trait and the Gemini implementation.
//!
//! The gateway only talks to `dyn LlmBackend`; tests substitute a mock
//! server for the hosted endpoint through `GeminiBackend::with_base_url`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
    #[error("Model returned no content (finish reason: {0})")]
    EmptyResponse(String),
    #[error("Cognitive link offline: no API credential configured")]
    Offline,
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// Structured-output schema. When set the backend asks for JSON.
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn backend_name(&self) -> &str;
    fn model_id(&self) -> &str;
    fn max_output_tokens(&self) -> usize;
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status >= 400 {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| {
                body["error"]["message"]
                    .as_str()
                    .or_else(|| body["message"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "unknown API error".to_string());
        return Err(LlmError::ApiError { status, message });
    }
    Ok(serde_json::from_str(&text)?)
}

// ── Google Gemini ─────────────────────────────────────────────────────────────

pub struct GeminiBackend {
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    api_key: SecretString,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            max_output_tokens: 4096,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Build the `generateContent` request body.
    pub(crate) fn request_body(&self, req: &LlmRequest) -> serde_json::Value {
        // System message → systemInstruction
        let system_text = req.messages.iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.clone());

        let contents: Vec<serde_json::Value> = req.messages.iter()
            .filter(|m| m.role != "system")
            .map(|m| {
                let role = if m.role == "assistant" { "model" } else { "user" };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": m.content }]
                })
            })
            .collect();

        let mut generation_config = serde_json::json!({
            "maxOutputTokens": req.max_tokens.unwrap_or(self.max_output_tokens),
            "temperature":     req.temperature.unwrap_or(0.2),
        });
        if let Some(ref schema) = req.response_schema {
            generation_config["responseMimeType"] = "application/json".into();
            generation_config["responseSchema"] = schema.clone();
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(sys) = system_text {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": sys }]
            });
        }
        body
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = req.model.as_deref().unwrap_or(&self.model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        let body = self.request_body(&req);

        let resp = self.client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let content = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("")
            .to_string();
        if content.is_empty() {
            let reason = json["candidates"][0]["finishReason"]
                .as_str()
                .or_else(|| json["promptFeedback"]["blockReason"].as_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(LlmError::EmptyResponse(reason));
        }

        let prompt_tokens = json["usageMetadata"]["promptTokenCount"]
            .as_u64().unwrap_or(0) as u32;
        let completion_tokens = json["usageMetadata"]["candidatesTokenCount"]
            .as_u64().unwrap_or(0) as u32;

        Ok(LlmResponse {
            content,
            model: model.to_string(),
            prompt_tokens,
            completion_tokens,
        })
    }

    fn backend_name(&self) -> &str { "gemini" }
    fn model_id(&self) -> &str { &self.model }
    fn max_output_tokens(&self) -> usize { self.max_output_tokens as usize }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
