//! Raw-file reading seam.
//!
//! The pipeline only needs "path in, columnar table out", expressed as the
//! [`SourceReader`] trait. [`JsonReader`] reads a columnar JSON document
//! (name -> {dtype, unit?, doc?, data}) and serves as the fixture-friendly
//! implementation; a FITS-backed reader plugs in at the same seam.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use fsrc_model::{ColumnData, Field, RawTable};

use crate::error::{IngestError, Result};

pub trait SourceReader {
    fn read_table(&self, path: &Path) -> Result<RawTable>;
}

#[derive(Debug, Deserialize)]
struct JsonColumn {
    dtype: String,
    unit: Option<String>,
    #[serde(default)]
    doc: String,
    data: Vec<serde_json::Value>,
}

/// Reads columnar JSON documents into raw tables.
#[derive(Debug, Default)]
pub struct JsonReader;

fn bad(path: &Path, message: impl Into<String>) -> IngestError {
    IngestError::BadSource {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn column_data(path: &Path, name: &str, dtype: &str, data: &[serde_json::Value]) -> Result<ColumnData> {
    let cell = |value: &serde_json::Value, wanted: &str| {
        bad(
            path,
            format!("column '{name}': expected {wanted}, found {value}"),
        )
    };
    match dtype {
        "int8" => data
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|i| i8::try_from(i).ok())
                    .ok_or_else(|| cell(v, "int8"))
            })
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::I8),
        "int16" => data
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|i| i16::try_from(i).ok())
                    .ok_or_else(|| cell(v, "int16"))
            })
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::I16),
        "int32" => data
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|i| i32::try_from(i).ok())
                    .ok_or_else(|| cell(v, "int32"))
            })
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::I32),
        "int64" => data
            .iter()
            .map(|v| v.as_i64().ok_or_else(|| cell(v, "int64")))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::I64),
        "float32" => data
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(|| cell(v, "float32")))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::F32),
        "float64" => data
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| cell(v, "float64")))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::F64),
        "bool" => data
            .iter()
            .map(|v| v.as_bool().ok_or_else(|| cell(v, "bool")))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::Bool),
        "str" => data
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| cell(v, "str")))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::Str),
        "point" => data
            .iter()
            .map(|v| {
                let pair = v.as_array().filter(|a| a.len() == 2)?;
                Some([pair[0].as_f64()?, pair[1].as_f64()?])
            })
            .map(|pair| pair.ok_or_else(|| bad(path, format!("column '{name}': expected [x, y]"))))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::Point64),
        other => Err(bad(path, format!("column '{name}': unknown dtype '{other}'"))),
    }
}

impl SourceReader for JsonReader {
    fn read_table(&self, path: &Path) -> Result<RawTable> {
        let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let columns: IndexMap<String, JsonColumn> =
            serde_json::from_str(&text).map_err(|source| IngestError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let mut table = RawTable::new();
        for (name, column) in columns {
            let data = column_data(path, &name, &column.dtype, &column.data)?;
            let mut field = Field::new(name, data, column.doc);
            if let Some(unit) = column.unit {
                field = field.with_unit(unit);
            }
            table.insert(field)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_columnar_document_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
  "objectId": {{"dtype": "int64", "data": [1, 2]}},
  "flux": {{"dtype": "float64", "unit": "count", "data": [0.5, -1.25]}},
  "flag": {{"dtype": "bool", "data": [true, false]}},
  "pos": {{"dtype": "point", "data": [[1.0, 2.0], [3.0, 4.0]]}}
}}"#
        )
        .unwrap();

        let table = JsonReader.read_table(file.path()).unwrap();
        let names: Vec<&String> = table.names().collect();
        assert_eq!(names, ["objectId", "flux", "flag", "pos"]);
        assert_eq!(table.row_count(), Some(2));
        assert_eq!(table.get("flux").unwrap().unit.as_deref(), Some("count"));
    }

    #[test]
    fn type_mismatch_is_reported_with_column_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n": {{"dtype": "int64", "data": ["oops"]}}}}"#).unwrap();
        let err = JsonReader.read_table(file.path()).unwrap_err();
        assert!(err.to_string().contains("column 'n'"));
    }
}
