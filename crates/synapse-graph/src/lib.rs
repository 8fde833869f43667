//! synapse-graph — Entity matching and node/edge graph construction.

pub mod matching;
pub mod graph;
pub mod bridge;

pub use bridge::{find_bridge_entities, BridgeEntity};
pub use graph::{build_collection_graph, build_graph, EntityGroup, GraphData, GraphEdge, GraphNode};
pub use matching::{names_match, normalize_name};
