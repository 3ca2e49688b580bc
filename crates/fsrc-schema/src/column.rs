//! Column and constraint specifications.
//!
//! The YAML documents probe-parse into permissive raw structs, then
//! classify into closed enums so the mapper can do exhaustive case
//! analysis instead of key-presence checks.

use regex::Regex;
use serde::Deserialize;

use fsrc_model::{ElementType, ForeignKey, Index};

use crate::error::{Result, SchemaError};

/// A schema-document token: YAML lets authors write numeric tokens bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawToken {
    Int(i64),
    Float(f64),
    Str(String),
}

impl RawToken {
    pub fn into_token(self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s,
        }
    }
}

pub(crate) fn into_tokens(raw: Vec<RawToken>) -> Vec<String> {
    raw.into_iter().map(RawToken::into_token).collect()
}

/// Raw column entry exactly as it appears in the document.
#[derive(Debug, Deserialize)]
pub(crate) struct RawColumn {
    pub column_type: String,
    pub name: Option<String>,
    pub name_re: Option<String>,
    pub dtype: String,
    pub unit: Option<String>,
    #[serde(default)]
    pub doc: String,
    pub compute: Option<Vec<RawToken>>,
    pub compute_array: Option<Vec<RawToken>>,
    pub inputs: Option<Vec<String>>,
}

/// A validated column declaration, one of four closed cases.
#[derive(Debug, Clone)]
pub enum ColumnSpec {
    /// Must match a raw column name exactly.
    Exact {
        name: String,
        dtype: ElementType,
        unit: Option<String>,
        doc: String,
    },
    /// Matches any raw column whose full name satisfies the pattern.
    Group {
        pattern: Regex,
        dtype: ElementType,
        doc: String,
    },
    /// Absent from the input; computed once per file from context values.
    ComputedScalar {
        name: String,
        dtype: ElementType,
        doc: String,
        compute: Vec<String>,
    },
    /// Absent from the input; derived element-wise from other raw columns.
    ComputedArray {
        name: String,
        dtype: ElementType,
        doc: String,
        inputs: Vec<String>,
        compute_array: Vec<String>,
    },
}

impl ColumnSpec {
    /// The declared name, or the group pattern text for group specs.
    pub fn label(&self) -> &str {
        match self {
            Self::Exact { name, .. }
            | Self::ComputedScalar { name, .. }
            | Self::ComputedArray { name, .. } => name,
            Self::Group { pattern, .. } => pattern.as_str(),
        }
    }

    pub(crate) fn classify(table: &str, raw: RawColumn) -> Result<Self> {
        let bad = |column: &str, reason: &str| SchemaError::BadColumn {
            table: table.to_string(),
            column: column.to_string(),
            reason: reason.to_string(),
        };

        let dtype: ElementType = raw.dtype.parse()?;
        match raw.column_type.as_str() {
            "column" => {
                let name = raw
                    .name
                    .ok_or_else(|| bad("<unnamed>", "column entry is missing 'name'"))?;
                match (raw.compute, raw.compute_array) {
                    (Some(_), Some(_)) => Err(bad(
                        &name,
                        "'compute' and 'compute_array' are mutually exclusive",
                    )),
                    (Some(compute), None) => Ok(Self::ComputedScalar {
                        name,
                        dtype,
                        doc: raw.doc,
                        compute: into_tokens(compute),
                    }),
                    (None, Some(compute_array)) => {
                        let inputs = raw
                            .inputs
                            .ok_or_else(|| bad(&name, "'compute_array' requires 'inputs'"))?;
                        Ok(Self::ComputedArray {
                            name,
                            dtype,
                            doc: raw.doc,
                            inputs,
                            compute_array: into_tokens(compute_array),
                        })
                    }
                    (None, None) => Ok(Self::Exact {
                        name,
                        dtype,
                        unit: raw.unit,
                        doc: raw.doc,
                    }),
                }
            }
            "group" => {
                let pattern_text = raw
                    .name_re
                    .ok_or_else(|| bad("<unnamed>", "group entry is missing 'name_re'"))?;
                if raw.compute.is_some() || raw.compute_array.is_some() {
                    return Err(bad(&pattern_text, "group entries cannot be computed"));
                }
                let pattern = compile_full_match(&pattern_text)?;
                Ok(Self::Group {
                    pattern,
                    dtype,
                    doc: raw.doc,
                })
            }
            other => Err(bad(
                raw.name.as_deref().unwrap_or("<unnamed>"),
                &format!("unknown column_type '{other}'"),
            )),
        }
    }
}

/// Compiles a pattern anchored for full-string matching.
pub(crate) fn compile_full_match(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| SchemaError::BadPattern {
        pattern: pattern.to_string(),
        source: Box::new(source),
    })
}

/// A table constraint, partitioned downstream into foreign keys and
/// indexes on the table image.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "constraint_type", rename_all = "lowercase")]
pub enum ConstraintSpec {
    Fk {
        name: Option<String>,
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
    },
    Index {
        name: Option<String>,
        columns: Vec<String>,
        #[serde(default)]
        unique: bool,
    },
}

impl ConstraintSpec {
    /// Converts into the model-side constraint, keyed by kind.
    pub fn into_model(self) -> ModelConstraint {
        match self {
            Self::Fk {
                name,
                columns,
                ref_table,
                ref_columns,
            } => ModelConstraint::ForeignKey(ForeignKey {
                name,
                columns,
                ref_table,
                ref_columns,
            }),
            Self::Index {
                name,
                columns,
                unique,
            } => ModelConstraint::Index(Index {
                name,
                columns,
                unique,
            }),
        }
    }
}

/// Model-side constraint produced from a [`ConstraintSpec`].
#[derive(Debug, Clone)]
pub enum ModelConstraint {
    ForeignKey(ForeignKey),
    Index(Index),
}
