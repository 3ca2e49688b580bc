use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown dtype name: {0}")]
    UnknownDtype(String),
    #[error("column '{column}' has {actual} rows, table has {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("column length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("operation '{op}' not defined for {lhs} and {rhs} columns")]
    TypeMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
