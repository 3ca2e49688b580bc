//! The storage executor seam.
//!
//! Everything the pipeline asks of the database goes through [`Executor`]:
//! plain statements, an existence probe, and the bulk-copy row sink. A
//! failed statement or bulk load is never retried here; the caller owns the
//! enclosing transaction and rolls it back.

use std::io::Read;

use crate::error::Result;

pub trait Executor {
    fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a query and reports whether it returned at least one row.
    fn exists(&mut self, sql: &str) -> Result<bool>;

    /// Streams tab-separated rows into `table` through a COPY-style bulk
    /// operation against the named column list.
    fn bulk_load(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &mut dyn Read,
        separator: u8,
    ) -> Result<u64>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// How many payload bytes a dry run shows per bulk load.
const DRY_RUN_SAMPLE: usize = 600;

/// Performs every transformation but writes what would run instead of
/// touching a database. Output content matches the real-run path minus
/// the calls.
#[derive(Debug)]
pub struct DryRunExecutor<W: std::io::Write> {
    out: W,
}

impl DryRunExecutor<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: std::io::Write> DryRunExecutor<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: std::io::Write> Executor for DryRunExecutor<W> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        writeln!(self.out, "{sql};")?;
        Ok(())
    }

    fn exists(&mut self, _sql: &str) -> Result<bool> {
        Ok(false)
    }

    fn bulk_load(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &mut dyn Read,
        _separator: u8,
    ) -> Result<u64> {
        let mut payload = Vec::new();
        rows.read_to_end(&mut payload)?;
        writeln!(self.out, "COPY {table} ({})", columns.join(", "))?;
        let shown = payload.len().min(DRY_RUN_SAMPLE);
        writeln!(self.out, "{}", String::from_utf8_lossy(&payload[..shown]))?;
        tracing::debug!(table, bytes = payload.len(), "dry-run bulk load");
        Ok(payload.len() as u64)
    }

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes everything as a psql script: plain statements terminated with
/// `;`, bulk loads as `COPY ... FROM stdin` blocks. Piping the output into
/// psql performs the real ingest; this keeps the database driver outside
/// the pipeline.
pub struct ScriptExecutor<W: std::io::Write> {
    out: W,
}

impl<W: std::io::Write> ScriptExecutor<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: std::io::Write> Executor for ScriptExecutor<W> {
    fn execute(&mut self, sql: &str) -> Result<()> {
        writeln!(self.out, "{sql};")?;
        Ok(())
    }

    // A script cannot ask the server anything; assume nothing exists.
    fn exists(&mut self, _sql: &str) -> Result<bool> {
        Ok(false)
    }

    fn bulk_load(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &mut dyn Read,
        _separator: u8,
    ) -> Result<u64> {
        writeln!(self.out, "COPY {table} ({}) FROM stdin;", columns.join(", "))?;
        let copied = std::io::copy(rows, &mut self.out)?;
        writeln!(self.out, "\\.")?;
        tracing::debug!(table, bytes = copied, "scripted bulk load");
        Ok(copied)
    }

    fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "BEGIN;")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        writeln!(self.out, "COMMIT;")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        writeln!(self.out, "ROLLBACK;")?;
        Ok(())
    }
}

/// One recorded bulk load.
#[derive(Debug)]
pub struct RecordedLoad {
    pub table: String,
    pub columns: Vec<String>,
    pub payload: Vec<u8>,
}

/// Test executor: records every call and answers existence probes from a
/// queue (defaulting to "not found").
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub statements: Vec<String>,
    pub loads: Vec<RecordedLoad>,
    pub exists_queries: Vec<String>,
    pub exists_responses: std::collections::VecDeque<bool>,
    pub committed: usize,
    pub rolled_back: usize,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer for the next existence probe.
    pub fn push_exists(&mut self, found: bool) {
        self.exists_responses.push_back(found);
    }
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, sql: &str) -> Result<()> {
        self.statements.push(sql.to_string());
        Ok(())
    }

    fn exists(&mut self, sql: &str) -> Result<bool> {
        self.exists_queries.push(sql.to_string());
        Ok(self.exists_responses.pop_front().unwrap_or(false))
    }

    fn bulk_load(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &mut dyn Read,
        _separator: u8,
    ) -> Result<u64> {
        let mut payload = Vec::new();
        rows.read_to_end(&mut payload)?;
        let len = payload.len() as u64;
        self.loads.push(RecordedLoad {
            table: table.to_string(),
            columns: columns.to_vec(),
            payload,
        });
        Ok(len)
    }

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.committed += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.rolled_back += 1;
        Ok(())
    }
}
