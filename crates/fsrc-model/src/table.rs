//! Raw input tables.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::field::Field;

/// An in-memory columnar table as read from one input file.
///
/// Column order is preserved; every field has the same row count.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    fields: IndexMap<String, Field>,
    /// Free-form header metadata carried along from the input file.
    pub header: BTreeMap<String, String>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, enforcing the uniform row-count invariant.
    pub fn insert(&mut self, field: Field) -> Result<()> {
        if self.fields.contains_key(&field.name) {
            return Err(ModelError::DuplicateColumn(field.name.clone()));
        }
        if let Some(expected) = self.row_count()
            && field.len() != expected
        {
            return Err(ModelError::RowCountMismatch {
                column: field.name.clone(),
                expected,
                actual: field.len(),
            });
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Row count shared by every column, or `None` for an empty table.
    pub fn row_count(&self) -> Option<usize> {
        self.fields.values().next().map(Field::len)
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Transfers a column out of the table, used by the mapper to move
    /// field ownership into a table image without aliasing.
    pub fn take(&mut self, name: &str) -> Option<Field> {
        self.fields.shift_remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ColumnData;

    #[test]
    fn insert_enforces_row_count() {
        let mut table = RawTable::new();
        table
            .insert(Field::new("a", ColumnData::I32(vec![1, 2, 3]), ""))
            .unwrap();
        let err = table
            .insert(Field::new("b", ColumnData::I32(vec![1]), ""))
            .unwrap_err();
        assert!(matches!(err, ModelError::RowCountMismatch { .. }));
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut table = RawTable::new();
        table
            .insert(Field::new("a", ColumnData::I32(vec![1]), ""))
            .unwrap();
        let err = table
            .insert(Field::new("a", ColumnData::I32(vec![2]), ""))
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateColumn(_)));
    }

    #[test]
    fn take_preserves_remaining_order() {
        let mut table = RawTable::new();
        for name in ["x", "y", "z"] {
            table
                .insert(Field::new(name, ColumnData::I32(vec![1]), ""))
                .unwrap();
        }
        table.take("y").unwrap();
        let names: Vec<&String> = table.names().collect();
        assert_eq!(names, ["x", "z"]);
    }
}
