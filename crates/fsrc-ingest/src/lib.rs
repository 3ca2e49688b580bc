//! Forced-source ingest: file discovery, raw-file reading, and the batch
//! pipeline that maps and bulk-loads one file at a time.

mod config;
mod error;
mod finder;
mod pipeline;
mod reader;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use finder::{Determiners, EMPTY_FILE_FLOOR, ForcedSourceFinder};
pub use pipeline::{Pipeline, VisitStats};
pub use reader::{JsonReader, SourceReader};
