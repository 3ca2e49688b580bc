use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("statement failed: {message}\n  sql: {sql}")]
    Execute { sql: String, message: String },
    #[error("bulk load into '{table}' failed: {message}")]
    BulkLoad { table: String, message: String },
    #[error("no transaction in progress")]
    NoTransaction,
}

pub type Result<T> = std::result::Result<T, StorageError>;
