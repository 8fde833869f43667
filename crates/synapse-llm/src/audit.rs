//! Audit records for gateway calls.
//! The output is kept only as a SHA-256 digest; records go to the tracing log.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub operation: String,
    pub model: String,
    pub backend: String,
    pub structured: bool,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operation: &str,
        backend: &str,
        model: &str,
        structured: bool,
        prompt_tokens: u32,
        completion_tokens: u32,
        output: &str,
        latency_ms: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(output.as_bytes());
        let output_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            operation: operation.to_string(),
            model: model.to_string(),
            backend: backend.to_string(),
            structured,
            prompt_tokens,
            completion_tokens,
            output_hash,
            latency_ms,
            called_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        tracing::info!(
            audit_id = %self.id,
            operation = %self.operation,
            backend = %self.backend,
            model = %self.model,
            structured = self.structured,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            output_sha256 = %self.output_hash,
            latency_ms = self.latency_ms,
            "LLM call completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_hashed_not_stored() {
        let entry = LlmAuditEntry::new("ask", "gemini", "gemini-test", false, 10, 3, "secret answer", 42);
        assert_eq!(entry.output_hash.len(), 64);
        assert!(!entry.output_hash.contains("secret"));
        let again = LlmAuditEntry::new("ask", "gemini", "gemini-test", false, 10, 3, "secret answer", 7);
        assert_eq!(entry.output_hash, again.output_hash);
        assert_ne!(entry.id, again.id);
    }
}
