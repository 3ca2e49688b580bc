use std::path::PathBuf;

use thiserror::Error;

use fsrc_model::ModelError;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("document is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("document root is not a mapping")]
    NotAMapping,
    #[error("invalid pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        source: Box<regex::Error>,
    },
    #[error("table '{table}', column entry '{column}': {reason}")]
    BadColumn {
        table: String,
        column: String,
        reason: String,
    },
    #[error(transparent)]
    Dtype(#[from] ModelError),
    #[error("view document: {0}")]
    View(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
