use thiserror::Error;

use fsrc_expr::ExprError;
use fsrc_model::ModelError;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("assumptions declare no tables")]
    NoTables,
    #[error("table '{table}': no surviving input column to take a row count from")]
    NoRowCount { table: String },
    #[error("table '{table}', column '{column}': {source}")]
    Column {
        table: String,
        column: String,
        source: ExprError,
    },
    #[error("table '{table}', column '{column}': computed value '{value}' does not fit dtype {dtype}")]
    BadScalarValue {
        table: String,
        column: String,
        value: String,
        dtype: String,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, MapError>;
