//! Configuration loading for Synapse.
//! Reads synapse.toml from the current directory or the path in the SYNAPSE_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;

use synapse_llm::backend::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use synapse_llm::GatewaySettings;
use synapse_ranker::SynapseWeights;

/// Env vars consulted, in order, when `llm.api_key` is empty.
pub const API_KEY_ENV_VARS: [&str; 2] = ["SYNAPSE_GEMINI_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    pub persona: Option<String>,
}

fn default_model()             -> String { DEFAULT_GEMINI_MODEL.to_string() }
fn default_base_url()          -> String { DEFAULT_GEMINI_BASE_URL.to_string() }
fn default_max_output_tokens() -> u32    { 4096 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: String::new(),
            max_output_tokens: default_max_output_tokens(),
            persona: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_dossier_snippets")]
    pub dossier_snippets: usize,
    /// `[scoring.weights]`; any field left out keeps its default.
    #[serde(default)]
    pub weights: SynapseWeights,
}

fn default_dossier_snippets() -> usize { synapse_llm::analysis::DEFAULT_DOSSIER_SNIPPETS }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { dossier_snippets: default_dossier_snippets(), weights: SynapseWeights::default() }
    }
}


impl Config {
    /// Load configuration from synapse.toml.
    /// Checks SYNAPSE_CONFIG env var first, then current directory.
    /// A missing file yields the defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("SYNAPSE_CONFIG")
            .unwrap_or_else(|_| "synapse.toml".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Config file not found: {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
        config.scoring.weights.validate()?;
        Ok(config)
    }

    /// The configured key, else the first non-empty env fallback.
    pub fn resolve_api_key<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let configured = self.llm.api_key.trim();
        if !configured.is_empty() {
            return Some(configured.to_string());
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| lookup(var))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    pub fn to_gateway_settings(&self) -> GatewaySettings {
        let api_key = self.resolve_api_key(|var| std::env::var(var).ok());
        if api_key.is_none() {
            tracing::warn!(
                "No Gemini API key found (set llm.api_key, SYNAPSE_GEMINI_API_KEY or GEMINI_API_KEY)"
            );
        }
        GatewaySettings {
            api_key,
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
            max_output_tokens: self.llm.max_output_tokens,
            persona: self.llm.persona.clone(),
        }
    }
}
