//! Public analysis operations.
//!
//! Each is one prompt, one gateway call, and a reshaping of the reply.
//! `analyze_document` propagates failures to the caller; the other three
//! degrade to a fixed placeholder string and log the cause.

use serde::Deserialize;
use synapse_common::confidence::clamp_confidence;
use synapse_common::{Entity, Insight, IntelPackage, Relation, StudyItem, TimelineEvent};
use synapse_graph::matching::{normalize_name, normalized_match};
use synapse_graph::find_bridge_entities;
use tracing::{info, warn};

use crate::backend::LlmError;
use crate::gateway::CognitiveGateway;
use crate::prompts::{self, ContextSnippet, TimelineLine};
use crate::schema::document_analysis_schema;

pub const DOSSIER_UNAVAILABLE: &str =
    "Dossier unavailable: the cognitive link could not profile this entity.";
pub const ANSWER_UNAVAILABLE: &str = "Unable to answer: the cognitive link is unavailable.";
pub const NARRATIVE_UNAVAILABLE: &str = "Narrative synthesis unavailable.";

/// Snippets used for a dossier when the caller does not say otherwise.
pub const DEFAULT_DOSSIER_SNIPPETS: usize = 6;

/// Shape of the structured analysis reply.
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    clean_text: String,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    relations: Vec<Relation>,
    #[serde(default)]
    insights: Vec<Insight>,
    #[serde(default)]
    timeline: Vec<TimelineEvent>,
    reliability: Option<f64>,
}

impl AnalysisResponse {
    fn into_package(self, raw_text: &str) -> IntelPackage {
        let entities = self
            .entities
            .into_iter()
            .filter(|e| !e.name.trim().is_empty())
            .map(|e| Entity { confidence: clamp_confidence(e.confidence), ..e })
            .collect();
        let relations = self
            .relations
            .into_iter()
            .map(|r| Relation { confidence: r.confidence.map(clamp_confidence), ..r })
            .collect();

        IntelPackage {
            title: self.title,
            summary: self.summary,
            raw_text: raw_text.to_string(),
            clean_text: self.clean_text,
            entities,
            relations,
            insights: self.insights,
            timeline: self.timeline,
            reliability: self.reliability.map(clamp_confidence),
        }
    }
}

/// Extract an intelligence package from a document. Errors propagate.
pub async fn analyze_document(
    gateway: &CognitiveGateway,
    text: &str,
    source: &str,
) -> Result<IntelPackage, LlmError> {
    let prompt = prompts::document_analysis_prompt(text, source);
    let reply: AnalysisResponse = gateway
        .generate_json("analyze_document", &prompt, document_analysis_schema())
        .await?;
    let package = reply.into_package(text);
    info!(
        entities = package.entities.len(),
        relations = package.relations.len(),
        insights = package.insights.len(),
        "Document analysed"
    );
    Ok(package)
}

/// Collect up to `limit` snippets from studies mentioning a matching entity.
pub fn dossier_snippets(entity: &str, studies: &[StudyItem], limit: usize) -> Vec<ContextSnippet> {
    let needle = normalize_name(entity);
    studies
        .iter()
        .filter_map(|study| {
            let mention = study
                .entities()
                .iter()
                .find(|e| normalized_match(&needle, &normalize_name(&e.name)))?;
            let detail = mention
                .role
                .as_deref()
                .or(mention.description.as_deref())
                .unwrap_or("");
            let summary = match (detail.is_empty(), study.intel.summary.is_empty()) {
                (true, _) => study.intel.summary.clone(),
                (false, true) => detail.to_string(),
                (false, false) => format!("{detail}. {}", study.intel.summary),
            };
            Some(ContextSnippet {
                study_title: study.display_title().to_string(),
                source: study.source.clone(),
                mention: mention.name.clone(),
                summary,
            })
        })
        .take(limit)
        .collect()
}

/// Generate a context card for one entity. Failure → placeholder.
pub async fn generate_entity_context(
    gateway: &CognitiveGateway,
    entity: &str,
    studies: &[StudyItem],
    max_snippets: usize,
) -> String {
    let snippets = dossier_snippets(entity, studies, max_snippets);
    let prompt = prompts::entity_context_prompt(entity, &snippets);
    match gateway.generate_text("entity_context", &prompt).await {
        Ok(card) => card,
        Err(e) => {
            warn!(entity, error = %e, "Entity dossier generation failed");
            DOSSIER_UNAVAILABLE.to_string()
        }
    }
}

/// Answer a question grounded in the collection. Failure → placeholder.
pub async fn ask_contextual_question(
    gateway: &CognitiveGateway,
    question: &str,
    studies: &[StudyItem],
) -> String {
    let prompt = prompts::contextual_question_prompt(question, studies);
    match gateway.generate_text("contextual_question", &prompt).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "Contextual question failed");
            ANSWER_UNAVAILABLE.to_string()
        }
    }
}

/// Historical timeline lines first, then the current study's.
pub fn merged_timeline(current: &StudyItem, historical: &[StudyItem]) -> Vec<TimelineLine> {
    let history = historical
        .iter()
        .filter(|s| s.id != current.id)
        .map(|s| (s, true));
    history
        .chain(std::iter::once((current, false)))
        .flat_map(|(study, is_historical)| {
            study.intel.timeline.iter().map(move |ev| TimelineLine {
                date: ev.date.clone(),
                event: ev.event.clone(),
                study_title: study.display_title().to_string(),
                historical: is_historical,
            })
        })
        .collect()
}

/// Narrative linking the current study to history. Failure → placeholder.
pub async fn generate_narrative(
    gateway: &CognitiveGateway,
    current: &StudyItem,
    historical: &[StudyItem],
) -> String {
    let timeline = merged_timeline(current, historical);
    let bridges = find_bridge_entities(current, historical);
    let prompt = prompts::narrative_prompt(current, &timeline, &bridges);
    match gateway.generate_text("narrative", &prompt).await {
        Ok(narrative) => narrative,
        Err(e) => {
            warn!(study = %current.id, error = %e, "Narrative generation failed");
            NARRATIVE_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GeminiBackend;
    use crate::gateway::OFFLINE_MESSAGE;
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use std::sync::Arc;
    use synapse_test_utils::{sample_collection, StudyBuilder};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> CognitiveGateway {
        let backend = GeminiBackend::new(SecretString::from("k".to_string()), "gemini-test")
            .with_base_url(server.uri());
        CognitiveGateway::new(Arc::new(backend))
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn test_analyze_document_reshapes_reply() {
        let server = MockServer::start().await;
        let payload = serde_json::json!({
            "title": "Drone strike on Sevastopol",
            "summary": "Naval drones struck the fleet HQ.",
            "clean_text": "Naval drones struck.",
            "entities": [
                { "name": "Black Sea Fleet", "type": "UNIT", "confidence": 1.4 },
                { "name": "  ", "type": "MISC", "confidence": 0.2 },
                { "name": "Sevastopol", "type": "LOCATION", "confidence": 0.9 }
            ],
            "relations": [
                { "source": "Black Sea Fleet", "target": "Sevastopol", "type": "BASED_IN", "confidence": -1 }
            ],
            "insights": [{ "category": "THREAT", "text": "Fleet exposed in port." }],
            "reliability": 0.8
        });
        Mock::given(method("POST"))
            .and(body_string_contains("responseSchema"))
            .respond_with(reply(&payload.to_string()))
            .expect(1)
            .mount(&server)
            .await;

        let pkg = analyze_document(&gateway(&server), "RAW REPORT", "TELEGRAM").await.unwrap();
        assert_eq!(pkg.title, "Drone strike on Sevastopol");
        assert_eq!(pkg.raw_text, "RAW REPORT");
        assert_eq!(pkg.entities.len(), 2);
        assert_eq!(pkg.entities[0].confidence, 1.0);
        assert_eq!(pkg.relations[0].confidence, Some(0.0));
        assert_eq!(pkg.reliability, Some(0.8));
        assert!(pkg.timeline.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_document_propagates_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(reply("{ not json")).mount(&server).await;
        let err = analyze_document(&gateway(&server), "text", "RSS").await.unwrap_err();
        assert!(matches!(err, LlmError::Serde(_)));
    }

    #[tokio::test]
    async fn test_analyze_document_offline_is_error() {
        let err = analyze_document(&CognitiveGateway::offline(), "text", "RSS").await.unwrap_err();
        assert!(matches!(err, LlmError::Offline));
    }

    #[tokio::test]
    async fn test_graceful_operations_substitute_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "message": "internal" }
            })))
            .mount(&server)
            .await;
        let gw = gateway(&server);
        let studies = sample_collection();

        assert_eq!(
            generate_entity_context(&gw, "Black Sea Fleet", &studies, 3).await,
            DOSSIER_UNAVAILABLE
        );
        assert_eq!(ask_contextual_question(&gw, "Where is the fleet?", &studies).await, ANSWER_UNAVAILABLE);
        assert_eq!(generate_narrative(&gw, &studies[1], &studies).await, NARRATIVE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_graceful_operations_offline_return_offline_message() {
        let gw = CognitiveGateway::offline();
        let studies = sample_collection();
        assert_eq!(ask_contextual_question(&gw, "q", &studies).await, OFFLINE_MESSAGE);
    }

    #[tokio::test]
    async fn test_dossier_prompt_includes_matching_reporting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Fleet redeployment to Novorossiysk"))
            .respond_with(reply("Black Sea Fleet: Russian Navy formation."))
            .expect(1)
            .mount(&server)
            .await;

        let card = generate_entity_context(&gateway(&server), "black-sea fleet", &sample_collection(), 6).await;
        assert_eq!(card, "Black Sea Fleet: Russian Navy formation.");
    }

    #[test]
    fn test_dossier_snippets_limit_and_detail() {
        let mut studies = sample_collection();
        studies[0].intel.entities[1].role = Some("Target of the strike".into());
        let snippets = dossier_snippets("Black Sea Fleet", &studies, 1);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].study_title, "Black Sea drone strike");
        assert_eq!(snippets[0].summary, "Target of the strike");
    }

    #[test]
    fn test_merged_timeline_orders_history_first() {
        let current = StudyBuilder::new("now").event("2024-03", "Strike").build();
        let history = vec![
            StudyBuilder::new("then").event("2014-02", "Annexation").build(),
            current.clone(),
        ];
        let lines = merged_timeline(&current, &history);
        let events: Vec<&str> = lines.iter().map(|l| l.event.as_str()).collect();
        assert_eq!(events, vec!["Annexation", "Strike"]);
        assert!(lines[0].historical);
        assert!(!lines[1].historical);
    }
}
