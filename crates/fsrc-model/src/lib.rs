//! Data model for forced-source catalog ingest.
//!
//! The types here are the contract between the mapper, the expression
//! engine and the storage layer: a [`RawTable`] of immutable [`Field`]
//! columns read from one input file, and the [`TableImage`] the mapper
//! folds it into before DDL generation or bulk load.

pub mod error;
pub mod field;
pub mod image;
pub mod table;

pub use error::{ModelError, Result};
pub use field::{ColumnData, ElementType, Field, FieldKind};
pub use image::{ForeignKey, Index, TableImage, create_schema_sql};
pub use table::RawTable;
