//! Discovery over synthetic directory trees.

use std::fs;
use std::path::Path;

use fsrc_ingest::ForcedSourceFinder;

fn touch(path: &Path, bytes: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0u8; bytes]).unwrap();
}

fn sample_tree() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let base = root.path();
    touch(
        &base.join("03455567-g/R23/forced_03455567-g-R23-S02-det091.fits"),
        100,
    );
    touch(
        &base.join("03455567-g/R23/forced_03455567-g-R23-S11-det092.fits"),
        10,
    );
    touch(
        &base.join("03455567-g/R23/not_a_data_file.txt"),
        100,
    );
    touch(
        &base.join("00012345-r/R01/forced_00012345-r-R01-S00-det001.fits"),
        100,
    );
    // Raft-like directory with out-of-range digits is ignored.
    touch(
        &base.join("00012345-r/R57/forced_00012345-r-R57-S00-det001.fits"),
        100,
    );
    fs::create_dir_all(base.join("calibrations")).unwrap();
    root
}

#[test]
fn visits_are_sorted_numbers() {
    let root = sample_tree();
    let finder = ForcedSourceFinder::new(root.path()).with_min_len(50);
    assert_eq!(finder.visits().unwrap(), vec![12_345, 3_455_567]);
}

#[test]
fn visit_files_skip_empty_and_foreign_files() {
    let root = sample_tree();
    let finder = ForcedSourceFinder::new(root.path()).with_min_len(50);
    let files = finder.visit_files(3_455_567).unwrap();
    assert_eq!(files.len(), 1);
    assert!(
        files[0]
            .to_str()
            .unwrap()
            .ends_with("forced_03455567-g-R23-S02-det091.fits")
    );
}

#[test]
fn unknown_visit_yields_no_files() {
    let root = sample_tree();
    let finder = ForcedSourceFinder::new(root.path()).with_min_len(50);
    assert!(finder.visit_files(99).unwrap().is_empty());
}

#[test]
fn determiners_keep_leading_zeros() {
    let root = sample_tree();
    let finder = ForcedSourceFinder::new(root.path()).with_min_len(50);
    let (path, determiners) = finder.some_file().unwrap();
    let from_path = finder.determiners(&path).unwrap();
    assert_eq!(determiners, from_path);
    assert_eq!(determiners.visit.len(), 8);
    assert!(determiners.visit.starts_with('0'));
}

#[test]
fn bad_file_name_is_rejected() {
    let root = sample_tree();
    let finder = ForcedSourceFinder::new(root.path());
    assert!(finder.determiners(Path::new("whatever.fits")).is_err());
}

#[test]
fn marker_key_parses_numeric_parts() {
    let root = sample_tree();
    let finder = ForcedSourceFinder::new(root.path()).with_min_len(50);
    let files = finder.visit_files(3_455_567).unwrap();
    let key = finder.determiners(&files[0]).unwrap().marker_key();
    assert_eq!(key.visit, 3_455_567);
    assert_eq!(key.raft, 23);
    assert_eq!(key.sensor, 2);
}
