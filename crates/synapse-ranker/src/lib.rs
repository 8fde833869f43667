//! synapse-ranker — Synapse priority scoring and the ranked study feed.

pub mod scorer;
pub mod weights;
pub mod feed;

pub use feed::{build_feed, build_feed_with, FeedEntry, FeedQuery};
pub use scorer::{score_collection, score_collection_with, score_study, Priority, SynapseScore};
pub use weights::SynapseWeights;
