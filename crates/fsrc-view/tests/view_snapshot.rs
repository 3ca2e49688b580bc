//! Full CREATE VIEW statement, pinned as a snapshot.

use fsrc_schema::{ViewOverride, ViewSpec};
use fsrc_view::DpddView;

const BASE: &str = r#"
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
"#;

const OVERRIDE: &str = r#"
view_name: dpdd
columns:
  - DPDDname: objectId
    NativeInputs: [object_id]
"#;

#[test]
fn create_view() {
    let base = ViewSpec::from_str(BASE).unwrap();
    let over = ViewOverride::from_str(OVERRIDE).unwrap();
    let view = DpddView::new("run12p", 3)
        .unwrap()
        .with_bands(vec!["g".into(), "r".into()]);
    let sql = view.view_string(base, Some(over)).unwrap();
    insta::assert_snapshot!(sql);
}
