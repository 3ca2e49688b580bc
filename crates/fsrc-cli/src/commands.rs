//! Command implementations.

use std::collections::BTreeMap;
use std::io;

use anyhow::Context;

use fsrc_ingest::{
    EMPTY_FILE_FLOOR, ForcedSourceFinder, IngestConfig, JsonReader, Pipeline, VisitStats,
};
use fsrc_pg::{DryRunExecutor, Executor, ScriptExecutor};
use fsrc_schema::{Assumptions, ViewOverride, ViewSpec};
use fsrc_view::DpddView;

use crate::cli::{CreateKeysArgs, CreateViewArgs, IngestArgs, SourceArgs, VisitsArgs};

fn parse_db_server(pairs: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut db = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("--db-server argument '{pair}' is not key=value"))?;
        db.insert(key.to_string(), value.to_string());
    }
    Ok(db)
}

fn make_executor(dry_run: bool) -> Box<dyn Executor> {
    if dry_run {
        Box::new(DryRunExecutor::stdout())
    } else {
        Box::new(ScriptExecutor::new(io::stdout()))
    }
}

fn make_finder(args: &SourceArgs) -> ForcedSourceFinder {
    ForcedSourceFinder::new(&args.forceddir)
        .with_min_len(args.min_file_len.unwrap_or(EMPTY_FILE_FLOOR))
}

fn load_assumptions(args: &SourceArgs) -> anyhow::Result<Assumptions> {
    Assumptions::from_path(&args.assumptions)
        .with_context(|| format!("loading assumptions from {}", args.assumptions.display()))
}

pub fn run_ingest(args: &IngestArgs) -> anyhow::Result<Vec<VisitStats>> {
    let config = IngestConfig {
        table_space: args.table_space.clone(),
        index_space: args.index_space.clone(),
        multicore: args.multicore,
        db: parse_db_server(&args.source.db_server)?,
    };
    let assumptions = load_assumptions(&args.source)?;
    let finder = make_finder(&args.source);
    let reader = JsonReader;
    let pipeline = Pipeline {
        config: &config,
        schema_name: &args.source.schemaname,
        assumptions: &assumptions,
        finder: &finder,
        reader: &reader,
    };
    let mut exec = make_executor(args.source.dry_run);

    pipeline.create_table(exec.as_mut())?;
    if let Some(spec_path) = &args.view_spec {
        let base = ViewSpec::from_path(spec_path)?;
        let over = args
            .view_override
            .as_deref()
            .map(ViewOverride::from_path)
            .transpose()?;
        pipeline.create_view(exec.as_mut(), base, over, args.dm_schema_version)?;
    }
    if args.no_insert {
        return Ok(Vec::new());
    }

    let visits = if args.visits.is_empty() {
        finder.visits()?
    } else {
        args.visits.clone()
    };
    let mut stats = Vec::new();
    for visit in visits {
        stats.push(pipeline.insert_visit(exec.as_mut(), visit)?);
    }
    Ok(stats)
}

pub fn run_create_keys(args: &CreateKeysArgs) -> anyhow::Result<()> {
    let config = IngestConfig {
        index_space: args.index_space.clone(),
        db: parse_db_server(&args.source.db_server)?,
        ..IngestConfig::default()
    };
    let assumptions = load_assumptions(&args.source)?;
    let finder = make_finder(&args.source);
    let reader = JsonReader;
    let pipeline = Pipeline {
        config: &config,
        schema_name: &args.source.schemaname,
        assumptions: &assumptions,
        finder: &finder,
        reader: &reader,
    };
    let mut exec = make_executor(args.source.dry_run);
    pipeline.create_keys(exec.as_mut())?;
    Ok(())
}

pub fn run_create_view(args: &CreateViewArgs) -> anyhow::Result<()> {
    let base = ViewSpec::from_path(&args.view_spec)?;
    let over = args
        .view_override
        .as_deref()
        .map(ViewOverride::from_path)
        .transpose()?;
    let builder = DpddView::new(&args.schemaname, args.dm_schema_version)?;
    let sql = builder.view_string(base, over)?;
    let mut exec = make_executor(args.dry_run);
    exec.begin()?;
    exec.execute(&sql)?;
    exec.commit()?;
    Ok(())
}

/// One row of the visits listing.
pub struct VisitListing {
    pub visit: u32,
    pub files: usize,
}

pub fn run_visits(args: &VisitsArgs) -> anyhow::Result<Vec<VisitListing>> {
    let finder = ForcedSourceFinder::new(&args.forceddir)
        .with_min_len(args.min_file_len.unwrap_or(EMPTY_FILE_FLOOR));
    let mut listing = Vec::new();
    for visit in finder.visits()? {
        let files = finder.visit_files(visit)?.len();
        listing.push(VisitListing { visit, files });
    }
    Ok(listing)
}
