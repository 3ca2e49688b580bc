//! Immutable column values.
//!
//! A [`Field`] is a named, typed, 1-D array plus its documentation and
//! provenance. Fields are value types: transforms such as precision
//! narrowing build a new `Field` with [`Field::with_data`] instead of
//! mutating in place, so a `TableImage` never aliases data held elsewhere.

use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Str,
    /// Composite (x, y) position, stored as pairs of doubles.
    Point64,
}

impl ElementType {
    /// PostgreSQL type used in generated DDL.
    pub fn sql_type(self) -> &'static str {
        match self {
            // Postgres has no 1-byte integer; int8 widens to Smallint.
            Self::I8 | Self::I16 => "Smallint",
            Self::I32 => "Integer",
            Self::I64 => "Bigint",
            Self::F32 => "Real",
            Self::F64 => "Double precision",
            Self::Bool => "Boolean",
            Self::Str => "Text",
            Self::Point64 => "Point",
        }
    }
}

impl FromStr for ElementType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int8" => Ok(Self::I8),
            "int16" => Ok(Self::I16),
            "int32" => Ok(Self::I32),
            "int64" => Ok(Self::I64),
            "float32" => Ok(Self::F32),
            "float64" => Ok(Self::F64),
            "bool" | "boolean" => Ok(Self::Bool),
            "str" | "string" | "text" => Ok(Self::Str),
            "point" => Ok(Self::Point64),
            other => Err(ModelError::UnknownDtype(other.to_string())),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Point64 => "point",
        };
        f.write_str(name)
    }
}

/// Homogeneous 1-D column data, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
    Point64(Vec<[f64; 2]>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Str(v) => v.len(),
            Self::Point64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::I8(_) => ElementType::I8,
            Self::I16(_) => ElementType::I16,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
            Self::Bool(_) => ElementType::Bool,
            Self::Str(_) => ElementType::Str,
            Self::Point64(_) => ElementType::Point64,
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::I8(_) => "int8",
            Self::I16(_) => "int16",
            Self::I32(_) => "int32",
            Self::I64(_) => "int64",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::Bool(_) => "bool",
            Self::Str(_) => "str",
            Self::Point64(_) => "point",
        }
    }

    fn check_len(&self, other: &Self) -> Result<()> {
        if self.len() != other.len() {
            return Err(ModelError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(())
    }

    /// Element-wise bitwise (integer) or logical (boolean) OR.
    pub fn bit_or(&self, other: &Self) -> Result<Self> {
        self.check_len(other)?;
        match (self, other) {
            (Self::I8(a), Self::I8(b)) => Ok(Self::I8(zip_with(a, b, |x, y| x | y))),
            (Self::I16(a), Self::I16(b)) => Ok(Self::I16(zip_with(a, b, |x, y| x | y))),
            (Self::I32(a), Self::I32(b)) => Ok(Self::I32(zip_with(a, b, |x, y| x | y))),
            (Self::I64(a), Self::I64(b)) => Ok(Self::I64(zip_with(a, b, |x, y| x | y))),
            (Self::Bool(a), Self::Bool(b)) => Ok(Self::Bool(zip_with(a, b, |x, y| x | y))),
            (lhs, rhs) => Err(ModelError::TypeMismatch {
                op: "or",
                lhs: lhs.variant_name(),
                rhs: rhs.variant_name(),
            }),
        }
    }

    /// Element-wise bitwise (integer) or logical (boolean) AND.
    pub fn bit_and(&self, other: &Self) -> Result<Self> {
        self.check_len(other)?;
        match (self, other) {
            (Self::I8(a), Self::I8(b)) => Ok(Self::I8(zip_with(a, b, |x, y| x & y))),
            (Self::I16(a), Self::I16(b)) => Ok(Self::I16(zip_with(a, b, |x, y| x & y))),
            (Self::I32(a), Self::I32(b)) => Ok(Self::I32(zip_with(a, b, |x, y| x & y))),
            (Self::I64(a), Self::I64(b)) => Ok(Self::I64(zip_with(a, b, |x, y| x & y))),
            (Self::Bool(a), Self::Bool(b)) => Ok(Self::Bool(zip_with(a, b, |x, y| x & y))),
            (lhs, rhs) => Err(ModelError::TypeMismatch {
                op: "and",
                lhs: lhs.variant_name(),
                rhs: rhs.variant_name(),
            }),
        }
    }

    /// Element-wise negation: compare-equal-zero for integer columns,
    /// logical NOT for booleans.
    pub fn eq_zero(&self) -> Result<Self> {
        match self {
            Self::I8(v) => Ok(Self::Bool(v.iter().map(|x| *x == 0).collect())),
            Self::I16(v) => Ok(Self::Bool(v.iter().map(|x| *x == 0).collect())),
            Self::I32(v) => Ok(Self::Bool(v.iter().map(|x| *x == 0).collect())),
            Self::I64(v) => Ok(Self::Bool(v.iter().map(|x| *x == 0).collect())),
            Self::Bool(v) => Ok(Self::Bool(v.iter().map(|x| !x).collect())),
            other => Err(ModelError::TypeMismatch {
                op: "not",
                lhs: other.variant_name(),
                rhs: other.variant_name(),
            }),
        }
    }
}

fn zip_with<T: Copy, F: Fn(T, T) -> T>(a: &[T], b: &[T], f: F) -> Vec<T> {
    a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()
}

/// Whether a field holds one scalar per row or a composite vector value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Scalar,
    Vector,
}

/// A named, typed, documented column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub unit: Option<String>,
    pub data: ColumnData,
    pub doc: String,
    /// For computed columns, the token program that produced the data.
    pub provenance: Option<Vec<String>>,
}

impl Field {
    pub fn new(name: impl Into<String>, data: ColumnData, doc: impl Into<String>) -> Self {
        let kind = match data {
            ColumnData::Point64(_) => FieldKind::Vector,
            _ => FieldKind::Scalar,
        };
        Self {
            name: name.into(),
            kind,
            unit: None,
            data,
            doc: doc.into(),
            provenance: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_provenance(mut self, tokens: Vec<String>) -> Self {
        self.provenance = Some(tokens);
        self
    }

    /// New field with the same name, unit, doc and provenance but different
    /// data. This is the only way field data changes.
    pub fn with_data(&self, data: ColumnData) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            unit: self.unit.clone(),
            data,
            doc: self.doc.clone(),
            provenance: self.provenance.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }
}
