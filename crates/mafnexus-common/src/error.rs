use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MafNexusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{} is missing required columns: {}", path.display(), missing.join(", "))]
    ValidationFailed { path: PathBuf, missing: Vec<String> },

    #[error("Merge failed: {0}")]
    MergeFailed(String),

    #[error("Annotation call failed: {0}")]
    AnnotationCallFailed(String),

    #[error("Malformed MAF file {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MafNexusError>;
