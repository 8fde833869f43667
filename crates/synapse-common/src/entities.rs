/// Core data model: studies and the intelligence packages extracted from them.
/// These are the Rust representations of the collection files and of the
/// structured output returned by the analysis model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::confidence::{default_confidence, DEFAULT_CONFIDENCE};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identity key. Graph nodes are keyed on this exact string.
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            role: None,
            description: None,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relation_type: String,
    /// Edge-weight multiplier; `None` falls back to the default confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Relation {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation_type: relation_type.into(),
            confidence: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Insight / Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub category: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Free text as reported by the source ("2023-04", "early March", ...).
    pub date: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
}

// ---------------------------------------------------------------------------
// Intelligence package
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelPackage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub clean_text: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    /// Source reliability in [0, 1]. Scoring treats `None` as 0.5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<f64>,
}

// ---------------------------------------------------------------------------
// Study
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyItem {
    #[serde(default = "generate_study_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Source channel the document arrived through.
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub intel: IntelPackage,
}

fn generate_study_id() -> String {
    Uuid::new_v4().to_string()
}

impl StudyItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>, intel: IntelPackage) -> Self {
        Self {
            id: generate_study_id(),
            title: title.into(),
            source: source.into(),
            date: None,
            tags: Vec::new(),
            intel,
        }
    }

    /// Title of the study, falling back to the package title.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.intel.title
        } else {
            &self.title
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.intel.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_confidence_defaults_when_absent() {
        let e: Entity = serde_json::from_str(r#"{"name": "Unit 8200", "type": "UNIT"}"#).unwrap();
        assert_eq!(e.entity_type, "UNIT");
        assert!((e.confidence - 0.5).abs() < 1e-9);
        assert!(e.role.is_none());
    }

    #[test]
    fn test_study_without_id_gets_one() {
        let s: StudyItem = serde_json::from_str(r#"{"title": "Port activity", "source": "OSINT"}"#).unwrap();
        assert!(Uuid::parse_str(&s.id).is_ok());
        assert!(s.intel.entities.is_empty());
        assert!(s.intel.reliability.is_none());
    }

    #[test]
    fn test_display_title_falls_back_to_package() {
        let mut intel = IntelPackage::default();
        intel.title = "Extracted title".to_string();
        let s = StudyItem::new("", "RSS", intel);
        assert_eq!(s.display_title(), "Extracted title");
    }
}
