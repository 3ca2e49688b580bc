//! End-to-end pipeline runs against a recording executor.

use std::fs;
use std::path::Path;

use fsrc_ingest::{ForcedSourceFinder, IngestConfig, JsonReader, Pipeline};
use fsrc_pg::{DryRunExecutor, RecordingExecutor, ScriptExecutor};
use fsrc_schema::Assumptions;

const ASSUMPTIONS: &str = r#"
ignores:
  - 'coord_.*'
tables:
  forcedsource:
    columns:
      - column_type: column
        name: objectId
        dtype: int64
      - column_type: column
        name: flux
        dtype: float64
      - column_type: column
        name: ccdVisitId
        dtype: int64
        compute: ['{visit}', 8, 'zerofill(,)']
    constraints:
      - constraint_type: index
        columns: [objectId]
"#;

const DATA: &str = r#"{
  "objectId": {"dtype": "int64", "data": [11, 12]},
  "flux": {"dtype": "float64", "data": [0.5, 1.5]},
  "coord_ra": {"dtype": "float64", "data": [3.2, 3.3]}
}"#;

fn fixture() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let file = root
        .path()
        .join("03455567-g/R23/forced_03455567-g-R23-S02-det091.fits");
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, DATA).unwrap();
    root
}

fn with_pipeline<F>(config: &IngestConfig, root: &Path, drive: F)
where
    F: FnOnce(&Pipeline<'_>),
{
    let assumptions = Assumptions::from_str(ASSUMPTIONS).unwrap();
    let finder = ForcedSourceFinder::new(root).with_min_len(0);
    let reader = JsonReader;
    let pipeline = Pipeline {
        config,
        schema_name: "run1",
        assumptions: &assumptions,
        finder: &finder,
        reader: &reader,
    };
    drive(&pipeline);
}

fn run<F>(config: &IngestConfig, root: &Path, drive: F) -> RecordingExecutor
where
    F: FnOnce(&Pipeline<'_>, &mut RecordingExecutor),
{
    let mut exec = RecordingExecutor::new();
    with_pipeline(config, root, |pipeline| drive(pipeline, &mut exec));
    exec
}

#[test]
fn create_table_emits_schema_then_table() {
    let root = fixture();
    let exec = run(&IngestConfig::default(), root.path(), |pipeline, exec| {
        pipeline.create_table(exec).unwrap();
    });
    assert_eq!(
        exec.statements[0],
        "CREATE SCHEMA IF NOT EXISTS \"run1\""
    );
    let table_sql = &exec.statements[1];
    assert!(table_sql.starts_with("CREATE TABLE \"run1\".\"forcedsource\""));
    // Precision policy ran before DDL: flux narrowed to Real.
    assert!(table_sql.contains("flux Real"));
    assert!(table_sql.contains("ccdVisitId Bigint"));
    assert!(!table_sql.contains("coord_ra"));
}

#[test]
fn insert_visit_loads_rows_and_sets_marker() {
    let root = fixture();
    let exec = run(&IngestConfig::default(), root.path(), |pipeline, exec| {
        pipeline.insert_visit(exec, 3_455_567).unwrap();
    });

    assert_eq!(exec.loads.len(), 1);
    let load = &exec.loads[0];
    assert_eq!(load.table, "\"run1\".\"forcedsource\"");
    assert_eq!(load.columns, ["objectId", "flux", "ccdVisitId"]);
    let payload = String::from_utf8(load.payload.clone()).unwrap();
    assert_eq!(payload, "11\t0.5\t3455567\n12\t1.5\t3455567\n");

    assert!(
        exec.statements
            .iter()
            .any(|sql| sql.contains("INSERT INTO \"run1\".\"_ingest:forced_bit\""))
    );
    assert_eq!(exec.committed, 1);
}

#[test]
fn marked_files_are_skipped_on_rerun() {
    let root = fixture();
    let exec = run(&IngestConfig::default(), root.path(), |pipeline, exec| {
        // Marker probe answers "already loaded".
        exec.push_exists(true);
        pipeline.insert_visit(exec, 3_455_567).unwrap();
    });
    assert!(exec.loads.is_empty());
    assert!(
        !exec
            .statements
            .iter()
            .any(|sql| sql.starts_with("INSERT INTO"))
    );
}

#[test]
fn streamed_and_materialized_loads_are_identical() {
    let root = fixture();
    let materialized = run(&IngestConfig::default(), root.path(), |pipeline, exec| {
        pipeline.insert_visit(exec, 3_455_567).unwrap();
    });
    let multicore = IngestConfig {
        multicore: true,
        ..IngestConfig::default()
    };
    let streamed = run(&multicore, root.path(), |pipeline, exec| {
        pipeline.insert_visit(exec, 3_455_567).unwrap();
    });
    assert_eq!(materialized.loads[0].payload, streamed.loads[0].payload);
}

#[test]
fn dry_run_output_matches_recorded_statements() {
    let root = fixture();
    let config = IngestConfig::default();
    let recorded = run(&config, root.path(), |pipeline, exec| {
        pipeline.create_table(exec).unwrap();
        pipeline.insert_visit(exec, 3_455_567).unwrap();
    });

    let mut dry = DryRunExecutor::new(Vec::new());
    with_pipeline(&config, root.path(), |pipeline| {
        pipeline.create_table(&mut dry).unwrap();
        pipeline.insert_visit(&mut dry, 3_455_567).unwrap();
    });
    let output = String::from_utf8(dry.into_inner()).unwrap();

    // Every statement the real-run path would execute shows up verbatim.
    for sql in &recorded.statements {
        assert!(output.contains(sql.as_str()), "dry run omitted: {sql}");
    }
    let payload = String::from_utf8(recorded.loads[0].payload.clone()).unwrap();
    assert!(output.contains(&payload));
}

#[test]
fn scripted_ddl_runs_inside_a_transaction() {
    let root = fixture();
    let config = IngestConfig::default();
    let mut exec = ScriptExecutor::new(Vec::new());
    with_pipeline(&config, root.path(), |pipeline| {
        pipeline.create_table(&mut exec).unwrap();
    });
    let script = String::from_utf8(exec.into_inner()).unwrap();
    assert!(script.starts_with("BEGIN;\nCREATE SCHEMA IF NOT EXISTS \"run1\";\n"));
    assert!(script.ends_with("COMMIT;\n"));
}

#[test]
fn create_keys_emits_constraint_ddl() {
    let root = fixture();
    let exec = run(&IngestConfig::default(), root.path(), |pipeline, exec| {
        pipeline.create_keys(exec).unwrap();
    });
    assert!(
        exec.statements
            .iter()
            .any(|sql| sql.starts_with("CREATE INDEX \"forcedsource_objectId_idx\""))
    );
}
