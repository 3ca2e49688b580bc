//! CLI argument definitions for the forced-source ingester.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "forced-ingest",
    version,
    about = "Ingest forced-source catalogs into PostgreSQL",
    long_about = "Read a forced-source data directory, reconcile its columns against\n\
                  a declared schema-assumptions document, and load the result into\n\
                  PostgreSQL tables with an optional DPDD view on top."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create tables and load visit data.
    Ingest(IngestArgs),

    /// Create foreign keys and indexes only; no data is inserted.
    CreateKeys(CreateKeysArgs),

    /// Create the DPDD view over already-ingested tables.
    CreateView(CreateViewArgs),

    /// List visits present in the data directory.
    Visits(VisitsArgs),
}

/// Arguments shared by every command that reads the data directory.
#[derive(Args)]
pub struct SourceArgs {
    /// Directory from which to read forced-source data.
    #[arg(value_name = "FORCEDDIR")]
    pub forceddir: PathBuf,

    /// Database schema name in which to load data.
    #[arg(value_name = "SCHEMANAME")]
    pub schemaname: String,

    /// Path to the schema-assumptions document.
    #[arg(long, default_value = "forced_source_assumptions.yaml")]
    pub assumptions: PathBuf,

    /// Files at or below this size hold no data rows and are skipped.
    #[arg(long = "min-file-len", value_name = "BYTES")]
    pub min_file_len: Option<u64>,

    /// Print SQL and row samples instead of producing a load script.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Database connection parameters, repeatable.
    #[arg(long = "db-server", value_name = "key=value")]
    pub db_server: Vec<String>,
}

#[derive(Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Ingest these visits only; all visits found when omitted.
    #[arg(long, value_name = "VISIT", num_args = 1..)]
    pub visits: Vec<u32>,

    /// Just create tables and views; no inserts.
    #[arg(long = "no-insert")]
    pub no_insert: bool,

    /// Path to the base DPDD view document; no view is created when omitted.
    #[arg(long = "view-spec", value_name = "PATH")]
    pub view_spec: Option<PathBuf>,

    /// Path to the database-specific view override document.
    #[arg(long = "view-override", value_name = "PATH")]
    pub view_override: Option<PathBuf>,

    /// Data-management schema version the data was produced with.
    #[arg(long = "dm-schema-version", default_value_t = 3)]
    pub dm_schema_version: u32,

    /// Tablespace clause appended verbatim to CREATE TABLE.
    #[arg(long = "table-space", value_name = "CLAUSE")]
    pub table_space: Option<String>,

    /// Tablespace clause appended verbatim to CREATE INDEX.
    #[arg(long = "index-space", value_name = "CLAUSE")]
    pub index_space: Option<String>,

    /// Stream bulk rows through a producer thread.
    #[arg(long)]
    pub multicore: bool,
}

#[derive(Args)]
pub struct CreateKeysArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Tablespace clause appended verbatim to CREATE INDEX.
    #[arg(long = "index-space", value_name = "CLAUSE")]
    pub index_space: Option<String>,
}

#[derive(Args)]
pub struct CreateViewArgs {
    /// Database schema name holding the ingested tables.
    #[arg(value_name = "SCHEMANAME")]
    pub schemaname: String,

    /// Path to the base DPDD view document.
    #[arg(long = "view-spec", value_name = "PATH")]
    pub view_spec: PathBuf,

    /// Path to the database-specific view override document.
    #[arg(long = "view-override", value_name = "PATH")]
    pub view_override: Option<PathBuf>,

    /// Data-management schema version the data was produced with.
    #[arg(long = "dm-schema-version", default_value_t = 3)]
    pub dm_schema_version: u32,

    /// Print the CREATE VIEW statement instead of producing a script.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct VisitsArgs {
    /// Directory from which to read forced-source data.
    #[arg(value_name = "FORCEDDIR")]
    pub forceddir: PathBuf,

    /// Files at or below this size hold no data rows and are skipped.
    #[arg(long = "min-file-len", value_name = "BYTES")]
    pub min_file_len: Option<u64>,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
