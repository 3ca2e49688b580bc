use std::path::PathBuf;

use thiserror::Error;

use fsrc_map::MapError;
use fsrc_pg::StorageError;
use fsrc_schema::SchemaError;
use fsrc_view::ViewError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file name does not follow the forced-source convention: {0}")]
    BadFileName(PathBuf),
    #[error("no input files found under {0}")]
    NoData(PathBuf),
    #[error("{path}: {message}")]
    BadSource { path: PathBuf, message: String },
    #[error("{path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Model(#[from] fsrc_model::ModelError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
