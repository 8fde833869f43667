//! synapse-llm — Cognitive gateway over a hosted generative-AI endpoint.
//! Backend trait, the Gemini backend, prompt and schema construction,
//! and the public analysis operations built on top of them.

pub mod backend;
pub mod gateway;
pub mod prompts;
pub mod schema;
pub mod analysis;
pub mod audit;

pub use analysis::{
    analyze_document, ask_contextual_question, generate_entity_context, generate_narrative,
};
pub use backend::{GeminiBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use gateway::{CognitiveGateway, GatewaySettings, OFFLINE_MESSAGE};
