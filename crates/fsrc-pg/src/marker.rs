//! Ingest markers.
//!
//! A small per-schema bookkeeping table records which (visit, raft,
//! sensor) units have already been bulk-loaded. The check and the data
//! load run in the same transaction, so a re-run skips completed files and
//! a failed file leaves no marker behind.

use crate::error::Result;
use crate::executor::Executor;

pub const MARKER_TABLE: &str = "_ingest:forced_bit";

/// One file's identity within a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerKey {
    pub visit: i64,
    pub raft: i32,
    pub sensor: i32,
}

/// Creates the marker table if it does not exist yet.
pub fn ensure(exec: &mut dyn Executor, schema: &str) -> Result<()> {
    exec.execute(&format!(
        "CREATE TABLE IF NOT EXISTS \"{schema}\".\"{MARKER_TABLE}\" (\n    \
         visit Bigint,\n    raft int,\n    sensor int,\n    \
         unique (visit, raft, sensor)\n)"
    ))
}

/// True when the unit has already been loaded.
pub fn contains(exec: &mut dyn Executor, schema: &str, key: MarkerKey) -> Result<bool> {
    exec.exists(&format!(
        "SELECT visit FROM \"{schema}\".\"{MARKER_TABLE}\" \
         WHERE visit={} and raft={} and sensor={}",
        key.visit, key.raft, key.sensor
    ))
}

/// Records the unit as loaded. Runs in the caller's transaction.
pub fn insert(exec: &mut dyn Executor, schema: &str, key: MarkerKey) -> Result<()> {
    tracing::debug!(
        visit = key.visit,
        raft = key.raft,
        sensor = key.sensor,
        "marking unit loaded"
    );
    exec.execute(&format!(
        "INSERT INTO \"{schema}\".\"{MARKER_TABLE}\" (visit, raft, sensor) \
         values({}, {}, {})",
        key.visit, key.raft, key.sensor
    ))
}
