//! The ingest pipeline.
//!
//! Batch processing, one input file at a time: discover, read, map, narrow
//! precision, bulk-load. Each file runs in its own transaction together
//! with its idempotence marker, so a failed file leaves nothing behind and
//! a re-run skips completed files.

use indexmap::IndexMap;

use fsrc_model::{TableImage, create_schema_sql};
use fsrc_pg::{CopyRows, Executor, marker};
use fsrc_schema::{Assumptions, ViewOverride, ViewSpec};
use fsrc_view::DpddView;

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::finder::{Determiners, ForcedSourceFinder};
use crate::reader::SourceReader;

/// What one `insert_visit` run did.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitStats {
    pub visit: u32,
    pub files: usize,
    pub loaded: usize,
    pub skipped: usize,
}

pub struct Pipeline<'a> {
    pub config: &'a IngestConfig,
    pub schema_name: &'a str,
    pub assumptions: &'a Assumptions,
    pub finder: &'a ForcedSourceFinder,
    pub reader: &'a dyn SourceReader,
}

impl Pipeline<'_> {
    /// Reads one sample file and maps it, to learn the table shape without
    /// loading anything.
    fn sample_images(&self) -> Result<IndexMap<String, TableImage>> {
        let (path, determiners) = self.finder.some_file()?;
        tracing::debug!(file = %path.display(), "probing schema from sample file");
        let raw = self.reader.read_table(&path)?;
        let images = fsrc_map::apply(
            self.assumptions,
            &raw,
            self.schema_name,
            &determiners.context(),
        )?;
        Ok(images)
    }

    fn table_exists(&self, exec: &mut dyn Executor, table: &str) -> Result<bool> {
        Ok(exec.exists(&format!(
            "SELECT 1 FROM information_schema.tables \
             WHERE table_schema='{}' AND table_name='{}'",
            self.schema_name, table
        ))?)
    }

    /// Creates the target schema and tables unless they already exist.
    pub fn create_table(&self, exec: &mut dyn Executor) -> Result<()> {
        let mut images = self.sample_images()?;
        exec.begin()?;
        exec.execute(&create_schema_sql(self.schema_name))?;
        for image in images.values_mut() {
            if self.table_exists(exec, &image.name)? {
                tracing::info!(table = %image.name, "table already exists");
                continue;
            }
            image.apply_precision_policy();
            exec.execute(&image.create_table_sql(self.config.table_space()))?;
        }
        exec.commit()?;
        Ok(())
    }

    /// Creates the DPDD view from its documents unless it already exists.
    pub fn create_view(
        &self,
        exec: &mut dyn Executor,
        base: ViewSpec,
        over: Option<ViewOverride>,
        dm_schema_version: u32,
    ) -> Result<()> {
        let view_name = over
            .as_ref()
            .and_then(|o| o.view_name.clone())
            .unwrap_or_else(|| base.view_name.clone());
        if self.table_exists(exec, &view_name)? {
            tracing::info!(view = %view_name, "view already exists");
            return Ok(());
        }
        let builder = DpddView::new(self.schema_name, dm_schema_version)?;
        let sql = builder.view_string(base, over)?;
        exec.begin()?;
        exec.execute(&sql)?;
        exec.commit()?;
        Ok(())
    }

    /// Creates foreign keys and indexes declared in the assumptions.
    pub fn create_keys(&self, exec: &mut dyn Executor) -> Result<()> {
        let images = self.sample_images()?;
        exec.begin()?;
        for image in images.values() {
            for sql in image.foreign_key_sql() {
                exec.execute(&sql)?;
            }
            for sql in image.index_sql(self.config.index_space()) {
                exec.execute(&sql)?;
            }
        }
        exec.commit()?;
        Ok(())
    }

    /// Loads every data file of one visit. Files already recorded in the
    /// marker table are skipped.
    pub fn insert_visit(&self, exec: &mut dyn Executor, visit: u32) -> Result<VisitStats> {
        let files = self.finder.visit_files(visit)?;
        tracing::info!(visit, files = files.len(), "loading visit");
        let mut stats = VisitStats {
            visit,
            files: files.len(),
            ..VisitStats::default()
        };
        for path in files {
            let determiners = self.finder.determiners(&path)?;
            exec.begin()?;
            match self.insert_file(exec, &path, &determiners) {
                Ok(loaded) => {
                    exec.commit()?;
                    if loaded {
                        stats.loaded += 1;
                    } else {
                        stats.skipped += 1;
                        tracing::info!(file = %path.display(), "already loaded, skipped");
                    }
                }
                Err(error) => {
                    exec.rollback()?;
                    return Err(error);
                }
            }
        }
        Ok(stats)
    }

    /// One file inside one open transaction. Returns false when the marker
    /// says the file was loaded before.
    fn insert_file(
        &self,
        exec: &mut dyn Executor,
        path: &std::path::Path,
        determiners: &Determiners,
    ) -> Result<bool> {
        marker::ensure(exec, self.schema_name)?;
        let key = determiners.marker_key();
        if marker::contains(exec, self.schema_name, key)? {
            return Ok(false);
        }

        let raw = self.reader.read_table(path)?;
        let mut images = fsrc_map::apply(
            self.assumptions,
            &raw,
            self.schema_name,
            &determiners.context(),
        )?;
        for image in images.values_mut() {
            image.apply_precision_policy();
            let rows = CopyRows::from_image(image);
            let columns = rows.field_names().to_vec();
            let qualified = format!("\"{}\".\"{}\"", self.schema_name, image.name);
            let loaded = if self.config.multicore {
                let mut reader = rows.into_reader();
                exec.bulk_load(&qualified, &columns, &mut reader, b'\t')
            } else {
                let payload = rows.materialize();
                exec.bulk_load(&qualified, &columns, &mut payload.as_slice(), b'\t')
            }
            .map_err(IngestError::from)?;
            tracing::debug!(table = %qualified, bytes = loaded, "bulk load complete");
        }

        marker::insert(exec, self.schema_name, key)?;
        Ok(true)
    }
}
