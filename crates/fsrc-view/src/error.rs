use thiserror::Error;

use fsrc_expr::ExprError;
use fsrc_schema::SchemaError;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("unsupported dm_schema_version {0}, expected 1, 2 or 3")]
    BadSchemaVersion(u32),
    #[error("view has no source tables")]
    NoTables,
    #[error(transparent)]
    Document(#[from] SchemaError),
    #[error("view column '{column}': {source}")]
    Column { column: String, source: ExprError },
}

pub type Result<T> = std::result::Result<T, ViewError>;
