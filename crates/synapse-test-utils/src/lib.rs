//! Fixture builders for Synapse tests.

use synapse_common::{Entity, IntelPackage, Relation, StudyItem, TimelineEvent};

pub use pretty_assertions;

pub fn entity(name: &str, entity_type: &str) -> Entity {
    Entity::new(name, entity_type)
}

pub fn relation(source: &str, target: &str, relation_type: &str, confidence: Option<f64>) -> Relation {
    Relation {
        confidence,
        ..Relation::new(source, target, relation_type)
    }
}

/// Builder for a [`StudyItem`] with a fixed id.
pub struct StudyBuilder {
    study: StudyItem,
}

impl StudyBuilder {
    pub fn new(id: &str) -> Self {
        let mut study = StudyItem::new(format!("Study {id}"), "OSINT", IntelPackage::default());
        study.id = id.to_string();
        Self { study }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.study.title = title.to_string();
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.study.source = source.to_string();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.study.tags.push(tag.to_string());
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.study.intel.summary = summary.to_string();
        self
    }

    pub fn reliability(mut self, reliability: f64) -> Self {
        self.study.intel.reliability = Some(reliability);
        self
    }

    pub fn entity(mut self, name: &str, entity_type: &str) -> Self {
        self.study.intel.entities.push(entity(name, entity_type));
        self
    }

    /// Add several entities of type ORG.
    pub fn entities(mut self, names: &[&str]) -> Self {
        for name in names {
            self.study.intel.entities.push(entity(name, "ORG"));
        }
        self
    }

    pub fn relation(mut self, source: &str, target: &str, relation_type: &str) -> Self {
        self.study.intel.relations.push(relation(source, target, relation_type, None));
        self
    }

    pub fn event(mut self, date: &str, event: &str) -> Self {
        self.study.intel.timeline.push(TimelineEvent {
            date: date.to_string(),
            event: event.to_string(),
            entities: Vec::new(),
        });
        self
    }

    pub fn build(self) -> StudyItem {
        self.study
    }
}

/// A small three-study collection with overlapping entities.
pub fn sample_collection() -> Vec<StudyItem> {
    vec![
        StudyBuilder::new("s-1")
            .title("Black Sea drone strike")
            .source("TELEGRAM")
            .tag("maritime")
            .reliability(0.9)
            .entity("Sevastopol", "LOCATION")
            .entity("Black Sea Fleet", "UNIT")
            .entity("Magura V5", "WEAPON")
            .relation("Magura V5", "Black Sea Fleet", "TARGETED")
            .build(),
        StudyBuilder::new("s-2")
            .title("Fleet redeployment to Novorossiysk")
            .source("SATELLITE")
            .tag("maritime")
            .tag("logistics")
            .reliability(0.7)
            .entity("Black Sea Fleet", "UNIT")
            .entity("Novorossiysk", "LOCATION")
            .build(),
        StudyBuilder::new("s-3")
            .title("Grain corridor tariff update")
            .source("NEWS")
            .tag("economy")
            .entity("Odesa Port Authority", "ORG")
            .build(),
    ]
}

pub fn to_json(studies: &[StudyItem]) -> String {
    serde_json::to_string_pretty(studies).expect("fixture serialises")
}
