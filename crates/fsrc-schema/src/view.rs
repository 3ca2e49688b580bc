//! DPDD view documents.
//!
//! The base document names the view, its join plan, and the published
//! columns. An override document has the same shape with every top-level
//! key optional; it partially supersedes the base.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::column::RawToken;
use crate::error::{Result, SchemaError};

/// One entry in the ordered join plan. The first entry stands alone;
/// every later entry must carry a join type and exactly one of `join_on`
/// or `join_using`.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinEntry {
    pub table_name: String,
    pub join_type: Option<String>,
    pub join_on: Option<String>,
    pub join_using: Option<Vec<String>>,
}

/// A published column: native inputs plus an optional postfix program.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewColumnSpec {
    #[serde(rename = "DPDDname")]
    pub dpdd_name: String,
    #[serde(rename = "NativeInputs")]
    pub native_inputs: Vec<String>,
    #[serde(rename = "RPN")]
    pub rpn: Option<Vec<RawToken>>,
    #[serde(rename = "Datatype")]
    pub datatype: Option<String>,
}

impl ViewColumnSpec {
    /// The postfix program as plain token strings, if one is declared.
    pub fn rpn_tokens(&self) -> Option<Vec<String>> {
        self.rpn
            .as_ref()
            .map(|tokens| tokens.iter().cloned().map(RawToken::into_token).collect())
    }
}

#[derive(Debug, Deserialize)]
struct RawViewSpec {
    view_name: String,
    table_spec: Vec<JoinEntry>,
    #[serde(default)]
    columns: Vec<ViewColumnSpec>,
}

#[derive(Debug, Deserialize)]
struct RawViewOverride {
    view_name: Option<String>,
    table_spec: Option<Vec<JoinEntry>>,
    #[serde(default)]
    columns: Vec<ViewColumnSpec>,
}

/// Validated base view document.
#[derive(Debug)]
pub struct ViewSpec {
    pub view_name: String,
    pub table_spec: Vec<JoinEntry>,
    pub columns: Vec<ViewColumnSpec>,
}

/// Validated override document.
#[derive(Debug, Default)]
pub struct ViewOverride {
    pub view_name: Option<String>,
    pub table_spec: Option<Vec<JoinEntry>>,
    pub columns: Vec<ViewColumnSpec>,
}

fn validate_join_plan(entries: &[JoinEntry]) -> Result<()> {
    if entries.is_empty() {
        return Err(SchemaError::View("no source tables for view".into()));
    }
    for entry in &entries[1..] {
        if entry.join_type.is_none() {
            return Err(SchemaError::View(format!(
                "table '{}': missing join_type",
                entry.table_name
            )));
        }
        match (&entry.join_on, &entry.join_using) {
            (Some(_), Some(_)) => {
                return Err(SchemaError::View(format!(
                    "table '{}': join_on and join_using are mutually exclusive",
                    entry.table_name
                )));
            }
            (None, None) => {
                return Err(SchemaError::View(format!(
                    "table '{}': missing join specification",
                    entry.table_name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_columns(columns: &[ViewColumnSpec]) -> Result<()> {
    for column in columns {
        if column.rpn.is_none() && column.native_inputs.len() != 1 {
            return Err(SchemaError::View(format!(
                "column '{}': passthrough requires exactly one native input",
                column.dpdd_name
            )));
        }
    }
    Ok(())
}

impl ViewSpec {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&text)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let raw: RawViewSpec = serde_yaml::from_str(text)?;
        validate_join_plan(&raw.table_spec)?;
        validate_columns(&raw.columns)?;
        Ok(Self {
            view_name: raw.view_name,
            table_spec: raw.table_spec,
            columns: raw.columns,
        })
    }

    /// Applies an override: `view_name` and `table_spec` replace the base
    /// wholesale; columns replace the base column with the same published
    /// name or are appended when no match exists.
    pub fn apply_override(&mut self, over: ViewOverride) {
        if let Some(view_name) = over.view_name {
            self.view_name = view_name;
        }
        if let Some(table_spec) = over.table_spec {
            self.table_spec = table_spec;
        }
        for column in over.columns {
            match self
                .columns
                .iter_mut()
                .find(|existing| existing.dpdd_name == column.dpdd_name)
            {
                Some(existing) => *existing = column,
                None => self.columns.push(column),
            }
        }
    }
}

impl ViewOverride {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&text)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        let raw: RawViewOverride = serde_yaml::from_str(text)?;
        if let Some(table_spec) = &raw.table_spec {
            validate_join_plan(table_spec)?;
        }
        validate_columns(&raw.columns)?;
        Ok(Self {
            view_name: raw.view_name,
            table_spec: raw.table_spec,
            columns: raw.columns,
        })
    }
}
