//! Cognitive gateway: the single entry point for model calls.
//!
//! Every call carries the analyst persona as system instruction and runs at
//! a fixed temperature of 0.2. Without an API credential the gateway has no
//! backend: text calls answer with [`OFFLINE_MESSAGE`], structured calls
//! fail with [`LlmError::Offline`].

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use regex::Regex;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::audit::LlmAuditEntry;
use crate::backend::{
    GeminiBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL,
};

pub const OFFLINE_MESSAGE: &str = "Cognitive link offline: no API credential configured.";

/// Sampling temperature for every call.
pub const TEMPERATURE: f64 = 0.2;

pub const ANALYST_PERSONA: &str = "You are SYNAPSE, a senior all-source intelligence analyst. \
You write in concise, neutral, evidence-first language. You distinguish reported facts from \
assessment, state confidence explicitly, never invent sources, and flag gaps in the reporting.";

/// Settings the gateway is built from. The API key is optional: without it
/// the gateway runs offline.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub persona: Option<String>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            max_output_tokens: 4096,
            persona: None,
        }
    }
}

pub struct CognitiveGateway {
    backend: Option<Arc<dyn LlmBackend>>,
    persona: String,
}

impl CognitiveGateway {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend: Some(backend), persona: ANALYST_PERSONA.to_string() }
    }

    pub fn offline() -> Self {
        Self { backend: None, persona: ANALYST_PERSONA.to_string() }
    }

    /// Build a Gemini-backed gateway, or an offline one when no key is set.
    pub fn from_settings(settings: &GatewaySettings) -> Self {
        let key = settings.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let gateway = match key {
            Some(key) => {
                let backend = GeminiBackend::new(SecretString::from(key.to_string()), settings.model.clone())
                    .with_base_url(settings.base_url.clone())
                    .with_max_output_tokens(settings.max_output_tokens);
                Self::new(Arc::new(backend))
            }
            None => {
                info!("No Gemini API key configured; cognitive gateway is offline");
                Self::offline()
            }
        };
        match settings.persona {
            Some(ref persona) if !persona.trim().is_empty() => gateway.with_persona(persona.clone()),
            _ => gateway,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Free-text completion. Offline → [`OFFLINE_MESSAGE`].
    pub async fn generate_text(&self, operation: &str, prompt: &str) -> Result<String, LlmError> {
        let Some(backend) = self.backend.as_ref() else {
            return Ok(OFFLINE_MESSAGE.to_string());
        };
        let resp = self.call(backend.as_ref(), operation, prompt, None).await?;
        Ok(resp.content.trim().to_string())
    }

    /// Structured completion parsed into `T`. Malformed JSON propagates.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<T, LlmError> {
        let backend = self.backend.as_ref().ok_or(LlmError::Offline)?;
        let resp = self.call(backend.as_ref(), operation, prompt, Some(schema)).await?;
        parse_json_payload(&resp.content)
    }

    async fn call(
        &self,
        backend: &dyn LlmBackend,
        operation: &str,
        prompt: &str,
        schema: Option<serde_json::Value>,
    ) -> Result<LlmResponse, LlmError> {
        let structured = schema.is_some();
        let req = LlmRequest {
            messages: vec![Message::system(self.persona.clone()), Message::user(prompt)],
            model: None,
            max_tokens: None,
            temperature: Some(TEMPERATURE),
            response_schema: schema,
        };
        debug!(operation, model = backend.model_id(), prompt_chars = prompt.len(), structured, "LLM request");

        let started = Instant::now();
        let resp = backend.complete(req).await?;
        LlmAuditEntry::new(
            operation,
            backend.backend_name(),
            &resp.model,
            structured,
            resp.prompt_tokens,
            resp.completion_tokens,
            &resp.content,
            started.elapsed().as_millis() as u64,
        )
        .emit();
        Ok(resp)
    }
}

fn code_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // ```json ... ``` around the whole payload
        Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").unwrap()
    })
}

/// Parse a model payload as JSON, tolerating a surrounding Markdown fence.
pub fn parse_json_payload<T: DeserializeOwned>(content: &str) -> Result<T, LlmError> {
    let trimmed = content.trim();
    let payload = code_fence_regex()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend returning a canned reply and recording requests.
    struct CannedBackend {
        reply: String,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl CannedBackend {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: reply.to_string(), seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
            self.seen.lock().unwrap().push(req);
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: "canned".to_string(),
                prompt_tokens: 1,
                completion_tokens: 1,
            })
        }
        fn backend_name(&self) -> &str { "canned" }
        fn model_id(&self) -> &str { "canned" }
        fn max_output_tokens(&self) -> usize { 1024 }
    }

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Verdict {
        threat: String,
    }

    #[test]
    fn test_offline_text_returns_fixed_message() {
        let gw = CognitiveGateway::offline();
        assert!(!gw.is_online());
        let text = tokio_test::block_on(gw.generate_text("ask", "anything")).unwrap();
        assert_eq!(text, OFFLINE_MESSAGE);
    }

    #[tokio::test]
    async fn test_offline_json_is_an_error() {
        let gw = CognitiveGateway::offline();
        let err = gw
            .generate_json::<Verdict>("analyze", "x", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Offline));
    }

    #[tokio::test]
    async fn test_requests_carry_persona_and_temperature() {
        let backend = CannedBackend::new("  ok  ");
        let gw = CognitiveGateway::new(backend.clone()).with_persona("custom persona");
        assert_eq!(gw.generate_text("ask", "question").await.unwrap(), "ok");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].messages[0].role, "system");
        assert_eq!(seen[0].messages[0].content, "custom persona");
        assert_eq!(seen[0].messages[1].content, "question");
        assert_eq!(seen[0].temperature, Some(0.2));
        assert!(seen[0].response_schema.is_none());
    }

    #[tokio::test]
    async fn test_json_with_fence_is_parsed() {
        let backend = CannedBackend::new("```json\n{\"threat\": \"elevated\"}\n```");
        let gw = CognitiveGateway::new(backend.clone());
        let v: Verdict = gw
            .generate_json("analyze", "x", serde_json::json!({ "type": "OBJECT" }))
            .await
            .unwrap();
        assert_eq!(v, Verdict { threat: "elevated".into() });
        assert!(backend.seen.lock().unwrap()[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn test_malformed_json_propagates() {
        let gw = CognitiveGateway::new(CannedBackend::new("not json at all"));
        let err = gw
            .generate_json::<Verdict>("analyze", "x", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Serde(_)));
    }

    #[test]
    fn test_from_settings_without_key_is_offline() {
        let settings = GatewaySettings { api_key: Some("   ".into()), ..Default::default() };
        assert!(!CognitiveGateway::from_settings(&settings).is_online());

        let settings = GatewaySettings {
            api_key: Some("AIza-test".into()),
            persona: Some("terse analyst".into()),
            ..Default::default()
        };
        let gw = CognitiveGateway::from_settings(&settings);
        assert!(gw.is_online());
        assert_eq!(gw.persona(), "terse analyst");
    }

    #[test]
    fn test_parse_plain_json() {
        let v: Verdict = parse_json_payload(" {\"threat\":\"low\"} ").unwrap();
        assert_eq!(v.threat, "low");
    }
}
