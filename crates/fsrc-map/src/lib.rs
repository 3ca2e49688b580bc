//! The assumption mapper.
//!
//! Reconciles the columns of one raw input table against the declared
//! assumptions and produces the table images ready for DDL generation and
//! bulk loading. Raw columns matching an ignore pattern are dropped before
//! any spec matching happens, so an ignored column can never reach an
//! output table.

mod error;

use std::collections::BTreeMap;

use indexmap::IndexMap;

use fsrc_expr::{rpn_eval, rpn_eval_array, substitute_context};
use fsrc_model::{ColumnData, ElementType, Field, RawTable, TableImage};
use fsrc_schema::{Assumptions, ColumnSpec, ModelConstraint};

pub use error::{MapError, Result};

/// Applies the assumptions to one raw table.
///
/// `context` carries run-time values such as visit, raft and sensor that
/// feed brace placeholders in computed-column programs. Exactly one table
/// image is produced per declared table; currently only the first declared
/// table is mapped.
pub fn apply(
    assumptions: &Assumptions,
    raw: &RawTable,
    schema_name: &str,
    context: &BTreeMap<String, String>,
) -> Result<IndexMap<String, TableImage>> {
    let (table_name, table_def) = assumptions.first_table().ok_or(MapError::NoTables)?;

    // Step 1: drop ignored columns. Exclusive with everything below.
    let surviving: Vec<(&String, &Field)> = raw
        .iter()
        .filter(|(name, _)| !assumptions.is_ignored(name))
        .collect();

    // Step 2: partition specs. Named specs are consumed by exact-name
    // matches; group specs match any number of raw columns.
    let mut named: Vec<&ColumnSpec> = Vec::new();
    let mut groups: Vec<&ColumnSpec> = Vec::new();
    for spec in &table_def.columns {
        match spec {
            ColumnSpec::Group { .. } => groups.push(spec),
            _ => named.push(spec),
        }
    }

    // Step 3: match surviving raw columns against the specs.
    let mut fields: IndexMap<String, Field> = IndexMap::new();
    for (name, field) in &surviving {
        if let Some(position) = named.iter().position(|spec| spec.label() == name.as_str()) {
            named.remove(position);
            fields.insert((*name).clone(), (*field).clone());
            continue;
        }
        let group_matched = groups.iter().any(|spec| match spec {
            ColumnSpec::Group { pattern, .. } => pattern.is_match(name),
            _ => false,
        });
        if group_matched {
            fields.insert((*name).clone(), (*field).clone());
        } else {
            tracing::warn!(column = %name, "input column unknown to assumptions, dropped");
        }
    }

    // Step 4: leftover named specs must be computed columns.
    for spec in named {
        match spec {
            ColumnSpec::ComputedScalar {
                name,
                dtype,
                doc,
                compute,
            } => {
                let data_len = surviving
                    .first()
                    .map(|(_, field)| field.len())
                    .ok_or_else(|| MapError::NoRowCount {
                        table: table_name.to_string(),
                    })?;
                let substituted = substitute_context(compute, context);
                let value =
                    rpn_eval(&[], &substituted).map_err(|source| MapError::Column {
                        table: table_name.to_string(),
                        column: name.clone(),
                        source,
                    })?;
                let data = scalar_column(*dtype, &value, data_len).ok_or_else(|| {
                    MapError::BadScalarValue {
                        table: table_name.to_string(),
                        column: name.clone(),
                        value: value.render(),
                        dtype: dtype.to_string(),
                    }
                })?;
                let field = Field::new(name.clone(), data, doc.clone())
                    .with_provenance(compute.clone());
                fields.insert(name.clone(), field);
            }
            ColumnSpec::ComputedArray {
                name,
                doc,
                inputs,
                compute_array,
                ..
            } => {
                let data = rpn_eval_array(inputs, compute_array, raw).map_err(|source| {
                    MapError::Column {
                        table: table_name.to_string(),
                        column: name.clone(),
                        source,
                    }
                })?;
                let field = Field::new(name.clone(), data, doc.clone())
                    .with_provenance(compute_array.clone());
                fields.insert(name.clone(), field);
            }
            other => {
                tracing::warn!(
                    column = other.label(),
                    "column known to assumptions, not found in input"
                );
            }
        }
    }

    // Steps 5 and 6: attach constraints and package the single image.
    let mut image = TableImage::new(table_name, schema_name, fields);
    image.set_filters(vec![String::new()]);
    for constraint in &table_def.constraints {
        match constraint.clone().into_model() {
            ModelConstraint::ForeignKey(fk) => image.foreign_keys.push(fk),
            ModelConstraint::Index(index) => image.indexes.push(index),
        }
    }

    let mut images = IndexMap::new();
    images.insert(table_name.to_string(), image);
    Ok(images)
}

/// Replicates one computed value into a whole column of the declared type.
/// `None` when the value cannot be represented in that type.
fn scalar_column(dtype: ElementType, value: &fsrc_expr::Value, len: usize) -> Option<ColumnData> {
    match dtype {
        ElementType::I8 => {
            let v = i8::try_from(value.as_int()?).ok()?;
            Some(ColumnData::I8(vec![v; len]))
        }
        ElementType::I16 => {
            let v = i16::try_from(value.as_int()?).ok()?;
            Some(ColumnData::I16(vec![v; len]))
        }
        ElementType::I32 => {
            let v = i32::try_from(value.as_int()?).ok()?;
            Some(ColumnData::I32(vec![v; len]))
        }
        ElementType::I64 => Some(ColumnData::I64(vec![value.as_int()?; len])),
        ElementType::Str => Some(ColumnData::Str(vec![value.render(); len])),
        _ => None,
    }
}
