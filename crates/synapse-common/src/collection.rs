//! Study collection loading.
//!
//! A collection is a JSON or YAML array of studies. The format is chosen
//! from the file extension.

use std::path::Path;

use tracing::debug;

use crate::entities::StudyItem;
use crate::error::{Result, SynapseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionFormat {
    Json,
    Yaml,
}

impl CollectionFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(SynapseError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a collection from a string in the given format.
pub fn parse_studies(content: &str, format: CollectionFormat) -> Result<Vec<StudyItem>> {
    let studies = match format {
        CollectionFormat::Json => serde_json::from_str(content)?,
        CollectionFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(studies)
}

/// Load a collection from a JSON or YAML file.
pub fn load_studies(path: impl AsRef<Path>) -> Result<Vec<StudyItem>> {
    let path = path.as_ref();
    let format = CollectionFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    let studies = parse_studies(&content, format)?;
    debug!(path = %path.display(), count = studies.len(), "Loaded study collection");
    Ok(studies)
}

/// Save a collection, format chosen from the extension.
pub fn save_studies(path: impl AsRef<Path>, studies: &[StudyItem]) -> Result<()> {
    let path = path.as_ref();
    let content = match CollectionFormat::from_path(path)? {
        CollectionFormat::Json => serde_json::to_string_pretty(studies)?,
        CollectionFormat::Yaml => serde_yaml::to_string(studies)?,
    };
    std::fs::write(path, content)?;
    Ok(())
}

/// Look up a study by id.
pub fn find_study<'a>(studies: &'a [StudyItem], id: &str) -> Result<&'a StudyItem> {
    studies
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SynapseError::StudyNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_YAML: &str = r#"
- id: s-1
  title: Harbour logistics report
  source: HUMINT
  tags: [maritime]
  intel:
    reliability: 0.8
    entities:
      - name: Port of Tartus
        type: FACILITY
"#;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(CollectionFormat::from_path(Path::new("a.json")).unwrap(), CollectionFormat::Json);
        assert_eq!(CollectionFormat::from_path(Path::new("a.YML")).unwrap(), CollectionFormat::Yaml);
        assert!(matches!(
            CollectionFormat::from_path(Path::new("a.csv")),
            Err(SynapseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_parse_yaml_collection() {
        let studies = parse_studies(SAMPLE_YAML, CollectionFormat::Yaml).unwrap();
        assert_eq!(studies.len(), 1);
        assert_eq!(studies[0].id, "s-1");
        assert_eq!(studies[0].intel.entities[0].name, "Port of Tartus");
        assert_eq!(studies[0].intel.reliability, Some(0.8));
    }

    #[test]
    fn test_save_then_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studies.json");
        let studies = parse_studies(SAMPLE_YAML, CollectionFormat::Yaml).unwrap();
        save_studies(&path, &studies).unwrap();
        let loaded = load_studies(&path).unwrap();
        assert_eq!(loaded, studies);
    }

    #[test]
    fn test_find_study_missing() {
        let studies = parse_studies(SAMPLE_YAML, CollectionFormat::Yaml).unwrap();
        assert!(find_study(&studies, "s-1").is_ok());
        assert!(matches!(find_study(&studies, "nope"), Err(SynapseError::StudyNotFound(_))));
    }
}
