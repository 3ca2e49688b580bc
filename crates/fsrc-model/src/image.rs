//! Database image of one table.
//!
//! A [`TableImage`] owns the reconciled columns for one table of one input
//! file. It is the last stop before storage: the precision policy runs
//! here, and the CREATE TABLE / constraint DDL is rendered from its ordered
//! field set. By default a table is multiband (columns are the direct
//! product of filters x fields); single-band tables carry one empty filter.

use indexmap::IndexMap;

use crate::field::{ColumnData, Field};

/// A foreign-key constraint attached to a table image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
}

/// An index attached to a table image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// One table's reconciled columns plus its storage-side bookkeeping.
#[derive(Debug, Clone)]
pub struct TableImage {
    pub name: String,
    pub schema_name: String,
    fields: IndexMap<String, Field>,
    filters: Vec<String>,
    /// Field names exempt from double-to-single precision narrowing.
    doubles: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
}

impl TableImage {
    pub fn new(
        name: impl Into<String>,
        schema_name: impl Into<String>,
        fields: IndexMap<String, Field>,
    ) -> Self {
        Self {
            name: name.into(),
            schema_name: schema_name.into(),
            fields,
            filters: vec![String::new()],
            doubles: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Sets the filter (band) list. Must be called before DDL generation
    /// for multiband tables; single-band tables keep the default `[""]`.
    pub fn set_filters(&mut self, filters: Vec<String>) {
        self.filters = filters;
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Registers field names that keep double precision.
    pub fn append_doubles(&mut self, names: impl IntoIterator<Item = String>) {
        self.doubles.extend(names);
    }

    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    pub fn row_count(&self) -> Option<usize> {
        self.fields.values().next().map(Field::len)
    }

    /// Narrows every 64-bit floating field to 32 bits unless its name is on
    /// the keep-double list. Replaces the field value, never mutates data.
    pub fn apply_precision_policy(&mut self) {
        let doubles = std::mem::take(&mut self.doubles);
        for field in self.fields.values_mut() {
            if let ColumnData::F64(values) = &field.data {
                if doubles.iter().any(|d| d == &field.name) {
                    continue;
                }
                tracing::debug!(field = %field.name, "narrowing to single precision");
                let narrowed = ColumnData::F32(values.iter().map(|v| *v as f32).collect());
                *field = field.with_data(narrowed);
            }
        }
        self.doubles = doubles;
    }

    fn member_list(&self, filters: &[String]) -> Vec<String> {
        let mut members = Vec::new();
        for filter in filters {
            let prefix = if filter.is_empty() {
                String::new()
            } else {
                format!("{filter}_")
            };
            for field in self.fields.values() {
                members.push(format!(
                    "{prefix}{} {}",
                    field.name,
                    field.element_type().sql_type()
                ));
            }
        }
        members
    }

    fn render_create(&self, filters: &[String], table_space: Option<&str>) -> String {
        let members = self.member_list(filters).join(",\n    ");
        let mut sql = format!(
            "CREATE TABLE \"{}\".\"{}\" (\n    {members}\n)",
            self.schema_name, self.name
        );
        if let Some(space) = table_space
            && !space.is_empty()
        {
            sql.push('\n');
            sql.push_str(space);
        }
        sql
    }

    /// CREATE TABLE statement with per-filter column expansion and an
    /// optional tablespace clause appended verbatim.
    pub fn create_table_sql(&self, table_space: Option<&str>) -> String {
        self.render_create(&self.filters, table_space)
    }

    /// Band-independent rendering: the same DDL while pretending there is a
    /// single no-filter band, whatever the configured filter list says.
    pub fn band_independent_sql(&self, table_space: Option<&str>) -> String {
        self.render_create(&[String::new()], table_space)
    }

    /// ALTER TABLE statements for the attached foreign keys.
    pub fn foreign_key_sql(&self) -> Vec<String> {
        self.foreign_keys
            .iter()
            .map(|fk| {
                let name = fk
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_{}_fkey", self.name, fk.ref_table));
                format!(
                    "ALTER TABLE \"{schema}\".\"{table}\" ADD CONSTRAINT \"{name}\" \
                     FOREIGN KEY ({cols}) REFERENCES \"{schema}\".\"{ref_table}\" ({refs})",
                    schema = self.schema_name,
                    table = self.name,
                    cols = fk.columns.join(", "),
                    ref_table = fk.ref_table,
                    refs = fk.ref_columns.join(", "),
                )
            })
            .collect()
    }

    /// CREATE INDEX statements for the attached indexes, with an optional
    /// index tablespace clause appended verbatim.
    pub fn index_sql(&self, index_space: Option<&str>) -> Vec<String> {
        self.indexes
            .iter()
            .map(|index| {
                let name = index
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_{}_idx", self.name, index.columns.join("_")));
                let unique = if index.unique { "UNIQUE " } else { "" };
                let mut sql = format!(
                    "CREATE {unique}INDEX \"{name}\" ON \"{}\".\"{}\" ({})",
                    self.schema_name,
                    self.name,
                    index.columns.join(", "),
                );
                if let Some(space) = index_space
                    && !space.is_empty()
                {
                    sql.push(' ');
                    sql.push_str(space);
                }
                sql
            })
            .collect()
    }
}

/// The DDL needed before any table exists in the target schema.
pub fn create_schema_sql(schema_name: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS \"{schema_name}\"")
}
