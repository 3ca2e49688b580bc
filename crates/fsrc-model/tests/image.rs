use indexmap::IndexMap;

use fsrc_model::{ColumnData, Field, ForeignKey, Index, TableImage};

fn sample_image() -> TableImage {
    let mut fields = IndexMap::new();
    fields.insert(
        "objectId".to_string(),
        Field::new("objectId", ColumnData::I64(vec![10, 11]), "object id"),
    );
    fields.insert(
        "psFlux".to_string(),
        Field::new("psFlux", ColumnData::F64(vec![1.5, 2.5]), "flux"),
    );
    fields.insert(
        "ra".to_string(),
        Field::new("ra", ColumnData::F64(vec![53.1, 53.2]), "right ascension"),
    );
    TableImage::new("forcedsource", "run12", fields)
}

#[test]
fn precision_policy_narrows_unlisted_doubles() {
    let mut image = sample_image();
    image.append_doubles(["ra".to_string()]);
    image.apply_precision_policy();

    assert_eq!(
        image.fields()["psFlux"].data,
        ColumnData::F32(vec![1.5, 2.5])
    );
    // Allow-listed field keeps its exact double values.
    assert_eq!(image.fields()["ra"].data, ColumnData::F64(vec![53.1, 53.2]));
    assert_eq!(image.fields()["objectId"].data, ColumnData::I64(vec![10, 11]));
}

#[test]
fn create_table_sql_lists_columns_in_order() {
    let image = sample_image();
    let sql = image.create_table_sql(None);
    assert_eq!(
        sql,
        "CREATE TABLE \"run12\".\"forcedsource\" (\n    \
         objectId Bigint,\n    \
         psFlux Double precision,\n    \
         ra Double precision\n)"
    );
}

#[test]
fn tablespace_clause_is_appended_verbatim() {
    let image = sample_image();
    let sql = image.create_table_sql(Some("TABLESPACE fast"));
    assert!(sql.ends_with(")\nTABLESPACE fast"));
}

#[test]
fn multiband_expansion_prefixes_each_filter() {
    let mut image = sample_image();
    image.set_filters(vec!["g".to_string(), "r".to_string()]);
    let sql = image.create_table_sql(None);
    assert!(sql.contains("g_psFlux Real") || sql.contains("g_psFlux Double precision"));
    assert!(sql.contains("r_objectId Bigint"));

    // Band-independent rendering ignores the configured filters.
    let flat = image.band_independent_sql(None);
    assert!(flat.contains("\n    objectId Bigint"));
    assert!(!flat.contains("g_objectId"));
}

#[test]
fn constraint_sql_uses_default_names() {
    let mut image = sample_image();
    image.foreign_keys.push(ForeignKey {
        name: None,
        columns: vec!["ccdVisitId".to_string()],
        ref_table: "ccdvisit".to_string(),
        ref_columns: vec!["ccdVisitId".to_string()],
    });
    image.indexes.push(Index {
        name: None,
        columns: vec!["objectId".to_string()],
        unique: false,
    });

    let fks = image.foreign_key_sql();
    assert_eq!(fks.len(), 1);
    assert!(fks[0].contains("ADD CONSTRAINT \"forcedsource_ccdvisit_fkey\""));
    assert!(fks[0].contains("REFERENCES \"run12\".\"ccdvisit\" (ccdVisitId)"));

    let idx = image.index_sql(Some("TABLESPACE idx"));
    assert_eq!(idx.len(), 1);
    assert!(idx[0].starts_with("CREATE INDEX \"forcedsource_objectId_idx\""));
    assert!(idx[0].ends_with("TABLESPACE idx"));
}
