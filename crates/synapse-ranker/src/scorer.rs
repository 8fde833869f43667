//! Synapse priority score.
//!
//! score = round(reliability × 50 + min(links, 5) × 10)
//!
//! where `links` counts the study's entities that match (fuzzy name match)
//! at least one entity of another study in the collection. Comparison is
//! O(n²) over the collection, which is fine at dashboard scale.

use serde::{Deserialize, Serialize};
use synapse_common::StudyItem;
use synapse_graph::matching::{normalize_name, normalized_match};
use tracing::debug;

use crate::weights::SynapseWeights;

/// Priority tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Routine,
    Moderate,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Routine  => "routine",
            Priority::Moderate => "moderate",
            Priority::High     => "high",
            Priority::Critical => "critical",
        }
    }

    /// Parse a tier name, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "routine"  => Some(Priority::Routine),
            "moderate" => Some(Priority::Moderate),
            "high"     => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _          => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynapseScore {
    pub study_id: String,
    pub score: i64,
    pub priority: Priority,
    pub reason: String,
    /// Number of the study's entities matched in other studies.
    pub connections: usize,
    /// Names (as written in this study) of the matched entities.
    pub linked_entities: Vec<String>,
}

/// Pre-normalised entity names of one study.
struct NormalizedStudy<'a> {
    id: &'a str,
    names: Vec<String>,
}

impl<'a> NormalizedStudy<'a> {
    fn new(study: &'a StudyItem) -> Self {
        Self {
            id: &study.id,
            names: study.entities().iter().map(|e| normalize_name(&e.name)).collect(),
        }
    }
}

/// Score one study against the collection it belongs to.
pub fn score_study(study: &StudyItem, collection: &[StudyItem]) -> SynapseScore {
    let index: Vec<NormalizedStudy<'_>> = collection.iter().map(NormalizedStudy::new).collect();
    score_against(study, &index, &SynapseWeights::default())
}

/// Score every study in the collection, in collection order.
pub fn score_collection(collection: &[StudyItem]) -> Vec<SynapseScore> {
    score_collection_with(collection, &SynapseWeights::default())
}

pub fn score_collection_with(collection: &[StudyItem], weights: &SynapseWeights) -> Vec<SynapseScore> {
    let index: Vec<NormalizedStudy<'_>> = collection.iter().map(NormalizedStudy::new).collect();
    let scores: Vec<SynapseScore> = collection
        .iter()
        .map(|study| score_against(study, &index, weights))
        .collect();
    debug!(studies = scores.len(), "Scored collection");
    scores
}

fn score_against(study: &StudyItem, index: &[NormalizedStudy<'_>], weights: &SynapseWeights) -> SynapseScore {
    let linked_entities: Vec<String> = study
        .entities()
        .iter()
        .filter(|entity| {
            let name = normalize_name(&entity.name);
            index
                .iter()
                .filter(|other| other.id != study.id)
                .any(|other| other.names.iter().any(|n| normalized_match(&name, n)))
        })
        .map(|entity| entity.name.clone())
        .collect();

    let reliability = study.intel.reliability.unwrap_or(weights.default_reliability);
    let score = compute_score(reliability, linked_entities.len(), weights);
    let (priority, reason) = classify(score, &linked_entities, weights);

    SynapseScore {
        study_id: study.id.clone(),
        score,
        priority,
        reason,
        connections: linked_entities.len(),
        linked_entities,
    }
}

/// round(reliability × reliability_points + min(links, max_links) × points_per_link)
pub fn compute_score(reliability: f64, connections: usize, weights: &SynapseWeights) -> i64 {
    let base = reliability * weights.reliability_points;
    let bonus = connections.min(weights.max_links) as f64 * weights.points_per_link;
    (base + bonus).round() as i64
}

/// Map a score and its linked entities to a tier and a reason string.
pub fn classify(score: i64, linked: &[String], weights: &SynapseWeights) -> (Priority, String) {
    if score > weights.critical_above {
        (
            Priority::Critical,
            format!("CRITICAL: {} entities cross-referenced across the collection.", linked.len()),
        )
    } else if score > weights.high_above {
        let reason = if linked.is_empty() {
            "High relevance: highly reliable source.".to_string()
        } else {
            let names: Vec<&str> = linked.iter().take(2).map(String::as_str).collect();
            format!("High relevance: linked via {}.", names.join(", "))
        };
        (Priority::High, reason)
    } else if !linked.is_empty() {
        (
            Priority::Moderate,
            format!("Moderate: {} cross-document connection(s).", linked.len()),
        )
    } else {
        (Priority::Routine, "Standard procedural review.".to_string())
    }
}
