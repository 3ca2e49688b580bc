//! The assumptions document.
//!
//! Describes a priori assumptions about the target tables and the input
//! columns that may or may not feed them: ignore patterns, per-table
//! column declarations, and table constraints. Parsed once and shared for
//! the life of the process.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::column::{ColumnSpec, ConstraintSpec, RawColumn, compile_full_match};
use crate::error::{Result, SchemaError};

#[derive(Debug, Deserialize)]
struct RawTableDef {
    #[serde(default)]
    columns: Vec<RawColumn>,
    #[serde(default)]
    constraints: Vec<ConstraintSpec>,
}

#[derive(Debug, Deserialize)]
struct RawAssumptions {
    #[serde(default)]
    ignores: Vec<String>,
    #[serde(default)]
    tables: IndexMap<String, RawTableDef>,
}

const KNOWN_KEYS: [&str; 2] = ["ignores", "tables"];

/// One table's validated declarations.
#[derive(Debug)]
pub struct TableDef {
    pub columns: Vec<ColumnSpec>,
    pub constraints: Vec<ConstraintSpec>,
}

/// Parsed and validated assumptions document with pre-compiled ignore
/// patterns.
#[derive(Debug)]
pub struct Assumptions {
    ignores: Vec<Regex>,
    tables: IndexMap<String, TableDef>,
}

impl Assumptions {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&text)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        let Some(mapping) = value.as_mapping() else {
            return Err(SchemaError::NotAMapping);
        };
        for key in mapping.keys() {
            if let Some(name) = key.as_str()
                && !KNOWN_KEYS.contains(&name)
            {
                tracing::warn!(key = name, "unknown assumptions key will be ignored");
            }
        }

        let raw: RawAssumptions = serde_yaml::from_value(value)?;

        let ignores = raw
            .ignores
            .iter()
            .map(|pattern| compile_full_match(pattern))
            .collect::<Result<Vec<_>>>()?;

        let mut tables = IndexMap::new();
        for (table_name, table) in raw.tables {
            let columns = table
                .columns
                .into_iter()
                .map(|raw_column| ColumnSpec::classify(&table_name, raw_column))
                .collect::<Result<Vec<_>>>()?;
            tables.insert(
                table_name,
                TableDef {
                    columns,
                    constraints: table.constraints,
                },
            );
        }

        Ok(Self { ignores, tables })
    }

    /// True if the raw column name fully matches any ignore pattern.
    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignores.iter().any(|pattern| pattern.is_match(column))
    }

    /// Declared table names, in document order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    /// The active table. Only one table is mapped at a time; multi-table
    /// fan-out is an extension point.
    pub fn first_table(&self) -> Option<(&str, &TableDef)> {
        self.tables
            .first()
            .map(|(name, def)| (name.as_str(), def))
    }
}
