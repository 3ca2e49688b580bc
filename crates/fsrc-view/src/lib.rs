//! DPDD view builder.
//!
//! Publishes the ingested native tables under the standardized DPDD column
//! names through a single view. The base document declares the join plan
//! and the column expressions; an optional override document adapts both
//! for a particular target database. Column expressions may reference four
//! placeholders: `{BAND}` expands once per configured photometric band,
//! while `{ERR}`, `{FLUX}` and `{PIXEL_SCALE}` substitute names that vary
//! with the data-management schema version.

mod error;

use fsrc_expr::rpn_to_sql;
use fsrc_schema::{JoinEntry, ViewColumnSpec, ViewOverride, ViewSpec};

pub use error::{Result, ViewError};

pub const DEFAULT_BANDS: [&str; 6] = ["g", "i", "r", "u", "y", "z"];
pub const DEFAULT_PIXEL_SCALE: f64 = 0.2;

/// View generator for one target schema.
#[derive(Debug)]
pub struct DpddView {
    schema_name: String,
    bands: Vec<String>,
    pixel_scale: f64,
    /// Native naming convention: "sigma" under version 1, "err" later.
    err_word: &'static str,
    /// Native naming convention: "flux" before version 3, "instflux" after.
    flux_word: &'static str,
}

impl DpddView {
    pub fn new(schema_name: impl Into<String>, dm_schema_version: u32) -> Result<Self> {
        let (err_word, flux_word) = match dm_schema_version {
            1 => ("sigma", "flux"),
            2 => ("err", "flux"),
            3 => ("err", "instflux"),
            other => return Err(ViewError::BadSchemaVersion(other)),
        };
        Ok(Self {
            schema_name: schema_name.into(),
            bands: DEFAULT_BANDS.iter().map(|b| (*b).to_string()).collect(),
            pixel_scale: DEFAULT_PIXEL_SCALE,
            err_word,
            flux_word,
        })
    }

    pub fn with_bands(mut self, bands: Vec<String>) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_pixel_scale(mut self, pixel_scale: f64) -> Self {
        self.pixel_scale = pixel_scale;
        self
    }

    /// Renders the join plan. The first table stands alone; later tables
    /// carry their declared join type and predicate.
    fn table_spec_sql(&self, entries: &[JoinEntry]) -> Result<String> {
        let (first, rest) = entries.split_first().ok_or(ViewError::NoTables)?;
        let schema = &self.schema_name;
        let mut sql = format!("\"{schema}\".{}", first.table_name);
        for entry in rest {
            let join_type = entry.join_type.as_deref().unwrap_or("join");
            sql.push_str(&format!(" {join_type} \"{schema}\".{}", entry.table_name));
            if let Some(predicate) = &entry.join_on {
                sql.push_str(&format!(" on {predicate}"));
            } else if let Some(columns) = &entry.join_using {
                sql.push_str(&format!(" using ({})", columns.join(", ")));
            }
        }
        Ok(sql)
    }

    /// Resolves one published column to its output expressions, expanding
    /// the band placeholder when present.
    fn resolve(&self, column: &ViewColumnSpec) -> Result<Vec<String>> {
        let expr = match column.rpn_tokens() {
            Some(rpn) => {
                rpn_to_sql(&column.native_inputs, &rpn).map_err(|source| ViewError::Column {
                    column: column.dpdd_name.clone(),
                    source,
                })?
            }
            None => column.native_inputs[0].clone(),
        };
        let published = format!("{expr} AS {}", column.dpdd_name);
        let published = published
            .replace("{ERR}", self.err_word)
            .replace("{FLUX}", self.flux_word)
            .replace("{PIXEL_SCALE}", &self.pixel_scale.to_string());

        if published.contains("{BAND}") {
            Ok(self
                .bands
                .iter()
                .map(|band| published.replace("{BAND}", band))
                .collect())
        } else {
            Ok(vec![published])
        }
    }

    /// Builds the complete CREATE VIEW statement from a base document and
    /// an optional override.
    pub fn view_string(&self, base: ViewSpec, over: Option<ViewOverride>) -> Result<String> {
        let mut spec = base;
        if let Some(over) = over {
            spec.apply_override(over);
        }

        let mut fields = Vec::new();
        for column in &spec.columns {
            fields.extend(self.resolve(column)?);
        }
        tracing::debug!(view = %spec.view_name, columns = fields.len(), "resolved view columns");

        let schema = &self.schema_name;
        Ok(format!(
            "CREATE VIEW {schema}.{view} AS (\n    SELECT\n        {fields}\n    FROM\n        {tables}\n    WHERE {schema}.position.detect_isprimary\n)",
            view = spec.view_name,
            fields = fields.join(",\n        "),
            tables = self.table_spec_sql(&spec.table_spec)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ViewSpec {
        ViewSpec::from_str(
            r#"
view_name: dpdd_forced
table_spec:
  - table_name: forcedsource
  - table_name: position
    join_type: 'join'
    join_using: [objectId]
columns:
  - DPDDname: objectId
    NativeInputs: [objectId]
  - DPDDname: psFlux_{BAND}
    NativeInputs: ['{BAND}_base_PsfFlux_{FLUX}']
    RPN: ['x1']
"#,
        )
        .unwrap()
    }

    #[test]
    fn band_placeholder_expands_in_band_order() {
        let view = DpddView::new("run1", 3)
            .unwrap()
            .with_bands(vec!["g".into(), "r".into(), "i".into()]);
        let sql = view.view_string(base(), None).unwrap();
        let expanded: Vec<&str> = sql.matches("AS psFlux_").collect();
        assert_eq!(expanded.len(), 3);
        let g = sql.find("psFlux_g").unwrap();
        let r = sql.find("psFlux_r").unwrap();
        let i = sql.find("psFlux_i").unwrap();
        assert!(g < r && r < i);
    }

    #[test]
    fn column_without_placeholder_emits_once() {
        let view = DpddView::new("run1", 3).unwrap();
        let sql = view.view_string(base(), None).unwrap();
        assert_eq!(sql.matches("AS objectId").count(), 1);
    }

    #[test]
    fn schema_version_drives_native_words() {
        let v1 = DpddView::new("run1", 1).unwrap();
        let sql = v1.view_string(base(), None).unwrap();
        assert!(sql.contains("g_base_PsfFlux_flux"));

        let v3 = DpddView::new("run1", 3).unwrap();
        let sql = v3.view_string(base(), None).unwrap();
        assert!(sql.contains("g_base_PsfFlux_instflux"));
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        assert!(matches!(
            DpddView::new("run1", 4),
            Err(ViewError::BadSchemaVersion(4))
        ));
    }

    #[test]
    fn empty_join_plan_is_rejected() {
        // Public fields allow building a spec that skips document
        // validation; the builder still refuses it.
        let mut spec = base();
        spec.table_spec.clear();
        let view = DpddView::new("run1", 3).unwrap();
        assert!(matches!(
            view.view_string(spec, None),
            Err(ViewError::NoTables)
        ));
    }

    #[test]
    fn join_plan_renders_using_clause() {
        let view = DpddView::new("run1", 3).unwrap();
        let sql = view.view_string(base(), None).unwrap();
        assert!(sql.contains("\"run1\".forcedsource join \"run1\".position using (objectId)"));
    }
}
