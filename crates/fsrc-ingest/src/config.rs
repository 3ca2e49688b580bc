//! Pipeline configuration.
//!
//! One explicit value threaded through the pipeline entry points; nothing
//! here is process-global.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct IngestConfig {
    /// Tablespace clause appended verbatim to CREATE TABLE, if any.
    pub table_space: Option<String>,
    /// Tablespace clause appended verbatim to CREATE INDEX, if any.
    pub index_space: Option<String>,
    /// Stream bulk rows through a producer thread instead of materializing.
    pub multicore: bool,
    /// Database connection parameters (`key=value` pairs from the command
    /// line), handed to whatever executor implementation connects.
    pub db: BTreeMap<String, String>,
}

impl IngestConfig {
    pub fn table_space(&self) -> Option<&str> {
        self.table_space.as_deref()
    }

    pub fn index_space(&self) -> Option<&str> {
        self.index_space.as_deref()
    }
}
