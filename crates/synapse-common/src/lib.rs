//! synapse-common — Shared types, errors, and loaders used across all Synapse crates.

pub mod error;
pub mod entities;
pub mod confidence;
pub mod collection;

// Re-export commonly used types
pub use entities::{Entity, Insight, IntelPackage, Relation, StudyItem, TimelineEvent};
pub use error::{Result, SynapseError};
