//! Forced-source file discovery.
//!
//! The on-disk layout is fixed: a root directory holding visit directories
//! named `<visit>-<filter>` (eight-digit zero-filled visit number), each
//! containing raft directories `Rmn`, each containing per-sensor files
//! `forced_<visit>-<filter>-Rmn-Sij-detNNN.fits`. Files at or below the
//! empty-file size floor hold no data rows and are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use fsrc_pg::MarkerKey;

use crate::error::{IngestError, Result};

/// A FITS file with an empty data table is still this many bytes long.
pub const EMPTY_FILE_FLOOR: u64 = 46_080;

static RAFT_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^R([0-4]{2})$").expect("static pattern"));
static VISIT_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{8})-[ugrizy]$").expect("static pattern"));
static BASENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^forced_([0-9]{8})-[ugrizy]-R([0-4]{2})-S([0-2]{2})-det[0-9]{3}\.fits$")
        .expect("static pattern")
});

/// Values uniquely determining one input file, as zero-filled strings the
/// way they appear in the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Determiners {
    pub visit: String,
    pub raft: String,
    pub sensor: String,
}

impl Determiners {
    /// The context map feeding computed-column placeholders.
    pub fn context(&self) -> BTreeMap<String, String> {
        let mut context = BTreeMap::new();
        context.insert("visit".to_string(), self.visit.clone());
        context.insert("raft".to_string(), self.raft.clone());
        context.insert("sensor".to_string(), self.sensor.clone());
        context
    }

    /// The numeric marker key for the idempotence table.
    pub fn marker_key(&self) -> MarkerKey {
        MarkerKey {
            visit: self.visit.parse().unwrap_or(0),
            raft: self.raft.parse().unwrap_or(0),
            sensor: self.sensor.parse().unwrap_or(0),
        }
    }
}

/// Knows where forced-source data lives and how its names decompose.
#[derive(Debug)]
pub struct ForcedSourceFinder {
    root: PathBuf,
    min_len: u64,
}

fn read_dir(path: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

impl ForcedSourceFinder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            min_len: EMPTY_FILE_FLOOR,
        }
    }

    /// Overrides the empty-file size floor, mainly for tests with tiny
    /// fixture files.
    pub fn with_min_len(mut self, min_len: u64) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All visit numbers present under the root, sorted.
    pub fn visits(&self) -> Result<Vec<u32>> {
        let mut visits = Vec::new();
        for dir in read_dir(&self.root)? {
            if let Some(captures) = VISIT_DIR.captures(file_name(&dir))
                && let Ok(visit) = captures[1].parse()
            {
                visits.push(visit);
            }
        }
        visits.sort_unstable();
        visits.dedup();
        Ok(visits)
    }

    fn visit_dir(&self, visit: u32) -> Result<Option<PathBuf>> {
        let prefix = format!("{visit:08}-");
        for dir in read_dir(&self.root)? {
            if file_name(&dir).starts_with(&prefix) && VISIT_DIR.is_match(file_name(&dir)) {
                return Ok(Some(dir));
            }
        }
        Ok(None)
    }

    /// Data files of one visit, skipping files with empty data tables.
    pub fn visit_files(&self, visit: u32) -> Result<Vec<PathBuf>> {
        let Some(visit_dir) = self.visit_dir(visit)? else {
            return Ok(Vec::new());
        };
        let mut files = Vec::new();
        for raft_dir in read_dir(&visit_dir)? {
            if !RAFT_DIR.is_match(file_name(&raft_dir)) {
                continue;
            }
            for file in read_dir(&raft_dir)? {
                if !BASENAME.is_match(file_name(&file)) {
                    continue;
                }
                let metadata = fs::metadata(&file).map_err(|source| IngestError::Io {
                    path: file.clone(),
                    source,
                })?;
                if metadata.len() <= self.min_len {
                    tracing::debug!(file = %file.display(), "skipping empty data file");
                    continue;
                }
                files.push(file);
            }
        }
        Ok(files)
    }

    /// Any one data file plus its determiners, for schema probing.
    pub fn some_file(&self) -> Result<(PathBuf, Determiners)> {
        for visit_dir in read_dir(&self.root)? {
            if !VISIT_DIR.is_match(file_name(&visit_dir)) {
                continue;
            }
            for raft_dir in read_dir(&visit_dir)? {
                if !RAFT_DIR.is_match(file_name(&raft_dir)) {
                    continue;
                }
                for file in read_dir(&raft_dir)? {
                    if BASENAME.is_match(file_name(&file)) {
                        let determiners = self.determiners(&file)?;
                        return Ok((file, determiners));
                    }
                }
            }
        }
        Err(IngestError::NoData(self.root.clone()))
    }

    /// Decomposes a file name into its determiners.
    pub fn determiners(&self, path: &Path) -> Result<Determiners> {
        let captures = BASENAME
            .captures(file_name(path))
            .ok_or_else(|| IngestError::BadFileName(path.to_path_buf()))?;
        Ok(Determiners {
            visit: captures[1].to_string(),
            raft: captures[2].to_string(),
            sensor: captures[3].to_string(),
        })
    }
}
