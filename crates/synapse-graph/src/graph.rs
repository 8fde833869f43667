//! Node/edge graph construction from extracted entities and relations.
//!
//! Pure set deduplication plus a type lookup table: no cycle detection,
//! no path algorithms.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use synapse_common::confidence::{confidence_or_default, DEFAULT_CONFIDENCE};
use synapse_common::{Entity, Relation, StudyItem};
use tracing::debug;

/// Multiplier applied to relation confidence to get the rendered edge weight.
const EDGE_WEIGHT_SCALE: f64 = 5.0;

/// Type tag given to nodes synthesised from relation endpoints.
pub const MISC_TYPE: &str = "MISC";

/// Visual category of a node, serialised as its number (1–8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EntityGroup {
    Person = 1,
    Organization = 2,
    Location = 3,
    Asset = 4,
    Event = 5,
    Temporal = 6,
    Capability = 7,
    Misc = 8,
}

impl EntityGroup {
    /// Case-insensitive lookup of an entity type tag.
    pub fn from_type(entity_type: &str) -> Self {
        match entity_type.trim().to_ascii_uppercase().as_str() {
            "PERSON" => Self::Person,
            "ORG" | "ORGANIZATION" | "UNIT" => Self::Organization,
            "LOCATION" | "REGION" | "FACILITY" => Self::Location,
            "OBJECT" | "ASSET" | "WEAPON" | "SYSTEM" => Self::Asset,
            "EVENT" | "INCIDENT" => Self::Event,
            "DATE" | "TIME" => Self::Temporal,
            "CAPABILITY" | "TECH" | "CYBER" => Self::Capability,
            _ => Self::Misc,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<EntityGroup> for u8 {
    fn from(group: EntityGroup) -> Self {
        group.as_u8()
    }
}

impl TryFrom<u8> for EntityGroup {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Person,
            2 => Self::Organization,
            3 => Self::Location,
            4 => Self::Asset,
            5 => Self::Event,
            6 => Self::Temporal,
            7 => Self::Capability,
            8 => Self::Misc,
            other => return Err(format!("invalid entity group {other}")),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// The entity name, verbatim. Case-sensitive.
    pub id: String,
    pub group: EntityGroup,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub confidence: f64,
}

impl GraphNode {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.name.clone(),
            group: EntityGroup::from_type(&entity.entity_type),
            entity_type: entity.entity_type.clone(),
            role: entity.role.clone(),
            description: entity.description.clone(),
            confidence: entity.confidence,
        }
    }

    fn misc(name: &str) -> Self {
        Self {
            id: name.to_string(),
            group: EntityGroup::Misc,
            entity_type: MISC_TYPE.to_string(),
            role: None,
            description: None,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub weight: f64,
}

/// Force-graph ready node/link lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

impl GraphData {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Build a graph from entities and relations.
///
/// Nodes keep first-seen order and the first entity with a given name wins.
/// Relation endpoints without an entity become MISC nodes. Every relation
/// yields one edge weighted `confidence (default 0.5) × 5`.
pub fn build_graph<'a, E, R>(entities: E, relations: R) -> GraphData
where
    E: IntoIterator<Item = &'a Entity>,
    R: IntoIterator<Item = &'a Relation>,
{
    let mut seen: AHashSet<String> = AHashSet::new();
    let mut graph = GraphData::default();

    for entity in entities {
        if seen.insert(entity.name.clone()) {
            graph.nodes.push(GraphNode::from_entity(entity));
        }
    }

    for relation in relations {
        for endpoint in [&relation.source, &relation.target] {
            if seen.insert(endpoint.clone()) {
                graph.nodes.push(GraphNode::misc(endpoint));
            }
        }
        graph.links.push(GraphEdge {
            source: relation.source.clone(),
            target: relation.target.clone(),
            label: relation.relation_type.clone(),
            weight: confidence_or_default(relation.confidence) * EDGE_WEIGHT_SCALE,
        });
    }

    debug!(nodes = graph.nodes.len(), links = graph.links.len(), "Graph built");
    graph
}

/// Build one graph over every entity and relation of a collection.
pub fn build_collection_graph(studies: &[StudyItem]) -> GraphData {
    build_graph(
        studies.iter().flat_map(|s| s.intel.entities.iter()),
        studies.iter().flat_map(|s| s.intel.relations.iter()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use synapse_test_utils::{entity, relation, StudyBuilder};

    #[test]
    fn test_type_lookup_table() {
        assert_eq!(EntityGroup::from_type("PERSON").as_u8(), 1);
        assert_eq!(EntityGroup::from_type("organization").as_u8(), 2);
        assert_eq!(EntityGroup::from_type("Unit").as_u8(), 2);
        assert_eq!(EntityGroup::from_type("FACILITY").as_u8(), 3);
        assert_eq!(EntityGroup::from_type("WEAPON").as_u8(), 4);
        assert_eq!(EntityGroup::from_type("INCIDENT").as_u8(), 5);
        assert_eq!(EntityGroup::from_type("TIME").as_u8(), 6);
        assert_eq!(EntityGroup::from_type("CYBER").as_u8(), 7);
        assert_eq!(EntityGroup::from_type("VEHICLE").as_u8(), 8);
        assert_eq!(EntityGroup::from_type("").as_u8(), 8);
    }

    #[test]
    fn test_duplicate_names_collapse() {
        let entities = vec![
            entity("Wagner Group", "ORG"),
            entity("Wagner Group", "PERSON"),
            entity("Bakhmut", "LOCATION"),
        ];
        let graph = build_graph(&entities, std::iter::empty());
        assert_eq!(graph.nodes.len(), 2);
        // first occurrence defines the node
        assert_eq!(graph.node("Wagner Group").unwrap().group, EntityGroup::Organization);
    }

    #[test]
    fn test_node_identity_is_case_sensitive() {
        let entities = vec![entity("Unit 8200", "UNIT"), entity("unit 8200", "UNIT")];
        let graph = build_graph(&entities, std::iter::empty());
        assert_eq!(graph.nodes.len(), 2);
    }

    #[test]
    fn test_relation_endpoints_become_misc_nodes() {
        let entities = vec![entity("APT28", "ORG")];
        let relations = vec![relation("APT28", "Sofacy Toolkit", "USES", Some(0.9))];
        let graph = build_graph(&entities, &relations);

        assert_eq!(graph.nodes.len(), 2);
        let misc = graph.node("Sofacy Toolkit").unwrap();
        assert_eq!(misc.group, EntityGroup::Misc);
        assert_eq!(misc.entity_type, MISC_TYPE);
        assert_eq!(graph.links.len(), 1);
        assert!((graph.links[0].weight - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_edge_weight_defaults_without_confidence() {
        let relations = vec![relation("A", "B", "LINKED", None)];
        let graph = build_graph(std::iter::empty(), &relations);
        assert!((graph.links[0].weight - 2.5).abs() < 1e-9);
        assert_eq!(graph.links[0].label, "LINKED");
    }

    #[test]
    fn test_collection_graph_merges_studies() {
        let studies = vec![
            StudyBuilder::new("a").entity("Kherson", "REGION").build(),
            StudyBuilder::new("b")
                .entity("Kherson", "REGION")
                .entity("Antonivskyi Bridge", "FACILITY")
                .relation("Antonivskyi Bridge", "Kherson", "LOCATED_IN")
                .build(),
        ];
        let graph = build_collection_graph(&studies);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Kherson", "Antonivskyi Bridge"]);
        assert_eq!(graph.links.len(), 1);
    }

    #[test]
    fn test_group_serialises_as_number() {
        let graph = build_graph(&[entity("Kim Jong Un", "PERSON")], std::iter::empty());
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["nodes"][0]["group"], 1);
        assert_eq!(json["nodes"][0]["id"], "Kim Jong Un");
        assert!(json["links"].as_array().unwrap().is_empty());
    }
}
