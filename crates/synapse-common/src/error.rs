use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynapseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported collection format: {0}")]
    UnsupportedFormat(String),

    #[error("Study not found: {0}")]
    StudyNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SynapseError>;
