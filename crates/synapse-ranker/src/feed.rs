//! Ranked study feed: the data side of the dashboard grid.
//!
//! Scores are always computed over the whole collection, then the query
//! filters are applied and the result is sorted by score (descending,
//! stable so ties keep collection order).

use std::collections::BTreeMap;

use serde::Serialize;
use synapse_common::StudyItem;
use tracing::debug;

use crate::scorer::{score_collection_with, Priority, SynapseScore};
use crate::weights::SynapseWeights;

/// Optional filters. An empty query returns the whole collection.
#[derive(Debug, Clone, Default)]
pub struct FeedQuery {
    /// Case-insensitive text over title, summary, tags and entity names.
    pub search: Option<String>,
    /// Exact source channel, case-insensitive.
    pub source: Option<String>,
    /// Exact tag, case-insensitive.
    pub tag: Option<String>,
    pub min_priority: Option<Priority>,
}

impl FeedQuery {
    fn accepts(&self, study: &StudyItem, score: &SynapseScore) -> bool {
        if let Some(min) = self.min_priority {
            if score.priority < min {
                return false;
            }
        }
        if let Some(ref source) = self.source {
            if !study.source.eq_ignore_ascii_case(source) {
                return false;
            }
        }
        if let Some(ref tag) = self.tag {
            if !study.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => matches_search(study, &needle.to_lowercase()),
            _ => true,
        }
    }
}

fn matches_search(study: &StudyItem, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    hit(study.display_title())
        || hit(study.intel.summary.as_str())
        || study.tags.iter().any(|t| hit(t.as_str()))
        || study.entities().iter().any(|e| hit(e.name.as_str()))
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry<'a> {
    pub study: &'a StudyItem,
    pub score: SynapseScore,
}

pub fn build_feed<'a>(studies: &'a [StudyItem], query: &FeedQuery) -> Vec<FeedEntry<'a>> {
    build_feed_with(studies, query, &SynapseWeights::default())
}

pub fn build_feed_with<'a>(
    studies: &'a [StudyItem],
    query: &FeedQuery,
    weights: &SynapseWeights,
) -> Vec<FeedEntry<'a>> {
    let mut entries: Vec<FeedEntry<'a>> = studies
        .iter()
        .zip(score_collection_with(studies, weights))
        .filter(|(study, score)| query.accepts(study, score))
        .map(|(study, score)| FeedEntry { study, score })
        .collect();

    entries.sort_by(|a, b| b.score.score.cmp(&a.score.score));
    debug!(total = studies.len(), shown = entries.len(), "Feed built");
    entries
}

/// Distinct source channels, sorted.
pub fn source_channels(studies: &[StudyItem]) -> Vec<String> {
    let mut sources: Vec<String> = studies
        .iter()
        .map(|s| s.source.clone())
        .filter(|s| !s.is_empty())
        .collect();
    sources.sort();
    sources.dedup();
    sources
}

/// Tag → number of studies carrying it.
pub fn tag_counts(studies: &[StudyItem]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for tag in studies.iter().flat_map(|s| s.tags.iter()) {
        *counts.entry(tag.clone()).or_insert(0) += 1;
    }
    counts
}
