//! Bridge entities: entities of a current study that also appear in
//! historical studies. They justify narrative links between documents.

use serde::Serialize;
use synapse_common::StudyItem;

use crate::matching::{normalize_name, normalized_match};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeEntity {
    /// Name as it appears in the current study.
    pub name: String,
    /// Name as it appears in the historical study.
    pub historical_name: String,
    pub historical_study_id: String,
    pub historical_title: String,
}

/// Find entities shared between `current` and any of `historical`.
///
/// Reports each (current entity, historical study) pair once, using the
/// first matching historical entity. The current study is skipped if it
/// appears in `historical`.
pub fn find_bridge_entities(current: &StudyItem, historical: &[StudyItem]) -> Vec<BridgeEntity> {
    let mut bridges = Vec::new();

    for entity in current.entities() {
        let needle = normalize_name(&entity.name);
        for study in historical.iter().filter(|s| s.id != current.id) {
            let hit = study
                .entities()
                .iter()
                .find(|other| normalized_match(&needle, &normalize_name(&other.name)));
            if let Some(other) = hit {
                bridges.push(BridgeEntity {
                    name: entity.name.clone(),
                    historical_name: other.name.clone(),
                    historical_study_id: study.id.clone(),
                    historical_title: study.display_title().to_string(),
                });
            }
        }
    }

    bridges
}

#[cfg(test)]
mod tests {
    use super::*;
    use synapse_test_utils::StudyBuilder;

    #[test]
    fn test_bridges_across_history() {
        let current = StudyBuilder::new("now")
            .entity("Wagner Group", "ORG")
            .entity("Timbuktu", "LOCATION")
            .build();
        let history = vec![
            StudyBuilder::new("2019").title("Sahel deployment").entity("wagner", "ORG").build(),
            StudyBuilder::new("2021").entity("Bamako", "LOCATION").build(),
        ];

        let bridges = find_bridge_entities(&current, &history);
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].name, "Wagner Group");
        assert_eq!(bridges[0].historical_name, "wagner");
        assert_eq!(bridges[0].historical_study_id, "2019");
        assert_eq!(bridges[0].historical_title, "Sahel deployment");
    }

    #[test]
    fn test_current_study_is_not_its_own_bridge() {
        let current = StudyBuilder::new("same").entity("Kharkiv", "REGION").build();
        let bridges = find_bridge_entities(&current, std::slice::from_ref(&current));
        assert!(bridges.is_empty());
    }

    #[test]
    fn test_one_bridge_per_historical_study() {
        let current = StudyBuilder::new("c").entity("Hezbollah", "ORG").build();
        let history = vec![StudyBuilder::new("h")
            .entity("Hezbollah", "ORG")
            .entity("hezbollah", "ORG")
            .build()];
        assert_eq!(find_bridge_entities(&current, &history).len(), 1);
    }
}
