//! Declarative documents driving the ingest pipeline: the assumptions
//! document (which raw columns feed which target tables) and the DPDD
//! view documents (how native columns publish through the view layer).

mod assumptions;
mod column;
mod error;
mod view;

pub use assumptions::{Assumptions, TableDef};
pub use column::{ColumnSpec, ConstraintSpec, ModelConstraint, RawToken};
pub use error::{Result, SchemaError};
pub use view::{JoinEntry, ViewColumnSpec, ViewOverride, ViewSpec};
