//! Mutation tests against small hand-written documents

use chartdoc_document::{EntityFields, Slot};
use chartdoc_editor::{
    derive_hierarchy, hierarchy::find_node, CommandOutcome, Document, EditSession, EditorConfig,
    Fields, Mutation, MutationError, PropertyUpdate, Target,
};
use serde_json::{json, Value};

fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

fn fields(value: Value) -> Fields {
    serde_json::from_value(value).unwrap()
}

fn apply(doc: &Document, mutation: Mutation) -> Result<Document, MutationError> {
    mutation.apply(doc, &EditorConfig::default())
}

fn matrix_doc() -> Document {
    doc(json!({
        "matrix": {
            "x": { "data": [null, null, null] },
            "y": { "data": [null, null, null] },
            "body": { "data": [] }
        }
    }))
}

#[test]
fn test_add_bar_to_matrix_wires_new_axes() {
    let next = apply(
        &matrix_doc(),
        Mutation::AddElement {
            kind: "series.bar".parse().unwrap(),
            parent: Some(Target::Matrix),
            initial: Some(fields(json!({ "coord": [0, 0] }))),
        },
    )
    .unwrap();

    assert_eq!(
        next.get("grid.0"),
        Some(&json!({
            "coordinateSystem": "matrix",
            "coord": [0, 0],
            "containLabel": true,
            "show": false,
            "borderWidth": 1,
            "borderColor": "#ccc"
        }))
    );
    assert_eq!(next.get("xAxis.0.gridIndex"), Some(&json!(0)));
    assert_eq!(next.get("xAxis.0.boundaryGap"), Some(&json!(true)));
    assert_eq!(next.get("yAxis.0.gridIndex"), Some(&json!(0)));

    let series = next.nth(Slot::Series, 0).unwrap();
    assert_eq!(series.type_name(), Some("bar"));
    assert_eq!(series.get("xAxisIndex"), Some(&json!(0)));
    assert_eq!(series.get("yAxisIndex"), Some(&json!(0)));
    assert_eq!(series.get("coordinateSystem"), Some(&json!("cartesian2d")));
    assert!(series.get("coord").is_none());

    let tree = derive_hierarchy(&next);
    let grid = find_node(&tree[0].children, &"grid.0".parse().unwrap()).unwrap();
    let ids: Vec<_> = grid.children.iter().map(|node| node.id()).collect();
    assert_eq!(ids, vec!["xAxis.0", "yAxis.0", "series.0"]);
}

#[test]
fn test_add_line_to_matrix_after_existing_axes() {
    let mut base = matrix_doc();
    base.set("grid", Some(json!([{}])));
    base.set("xAxis", Some(json!([{}])));
    base.set("yAxis", Some(json!([{}])));

    let next = apply(
        &base,
        Mutation::AddElement {
            kind: "series.line".parse().unwrap(),
            parent: Some(Target::Matrix),
            initial: None,
        },
    )
    .unwrap();

    assert_eq!(next.get("xAxis.1.gridIndex"), Some(&json!(1)));
    assert_eq!(next.get("xAxis.1.boundaryGap"), Some(&json!(false)));
    assert_eq!(next.get("series.0.xAxisIndex"), Some(&json!(1)));
    assert_eq!(next.get("series.0.yAxisIndex"), Some(&json!(1)));
}

#[test]
fn test_add_axis_to_matrix_is_rejected() {
    let result = apply(
        &matrix_doc(),
        Mutation::AddElement {
            kind: "xAxis".parse().unwrap(),
            parent: Some(Target::Matrix),
            initial: None,
        },
    );

    assert!(matches!(result, Err(MutationError::InvalidTarget { .. })));
}

#[test]
fn test_add_second_matrix_is_rejected() {
    let result = apply(
        &matrix_doc(),
        Mutation::AddElement {
            kind: "matrix".parse().unwrap(),
            parent: None,
            initial: None,
        },
    );

    assert_eq!(result, Err(MutationError::MatrixExists));
}

#[test]
fn test_add_axis_under_grid_binds_it() {
    let base = doc(json!({ "grid": [{}, {}] }));
    let next = apply(
        &base,
        Mutation::AddElement {
            kind: "yAxis".parse().unwrap(),
            parent: Some(Target::Grid(1)),
            initial: None,
        },
    )
    .unwrap();

    assert_eq!(next.get("yAxis.0.gridIndex"), Some(&json!(1)));
}

#[test]
fn test_reparent_series_into_matrix_and_back() {
    let base = doc(json!({
        "matrix": {},
        "grid": [{}],
        "xAxis": [{}],
        "yAxis": [{}],
        "series": [{ "type": "scatter", "data": [[1, 2]] }]
    }));
    let path = "series.0".parse().unwrap();

    let inside = apply(
        &base,
        Mutation::ReparentElement {
            path,
            target: Target::Matrix,
        },
    )
    .unwrap();
    assert_eq!(inside.count(Slot::Grid), 2);
    assert_eq!(inside.get("grid.1.coord"), Some(&json!([0, 0])));
    assert_eq!(inside.get("series.0.xAxisIndex"), Some(&json!(1)));

    let outside = apply(
        &inside,
        Mutation::ReparentElement {
            path,
            target: Target::Root,
        },
    )
    .unwrap();
    assert_eq!(outside.get("series.0.xAxisIndex"), Some(&json!(0)));
    assert_eq!(outside.get("series.0.yAxisIndex"), Some(&json!(0)));
    assert_eq!(outside.get("series.0.coordinateSystem"), Some(&json!("cartesian2d")));
}

#[test]
fn test_detach_rebuilds_missing_grid_and_axes() {
    let base = doc(json!({
        "matrix": {},
        "series": [{ "type": "line", "coordinateSystem": "matrix", "coord": [1, 1] }]
    }));

    let next = apply(
        &base,
        Mutation::ReparentElement {
            path: "series.0".parse().unwrap(),
            target: Target::Root,
        },
    )
    .unwrap();

    assert_eq!(next.count(Slot::Grid), 1);
    assert_eq!(next.count(Slot::XAxis), 1);
    assert_eq!(next.count(Slot::YAxis), 1);
    assert_eq!(next.get("series.0.xAxisIndex"), Some(&json!(0)));
    assert_eq!(next.get("series.0.yAxisIndex"), Some(&json!(0)));
    assert_eq!(next.get("series.0.coordinateSystem"), Some(&json!("cartesian2d")));
    assert!(next.get("series.0.coord").is_none());

    let tree = derive_hierarchy(&next);
    let grid = find_node(&tree, &"grid.0".parse().unwrap()).unwrap();
    assert!(grid.children.iter().any(|node| node.id() == "series.0"));
}

#[test]
fn test_reparent_component_into_matrix() {
    let base = doc(json!({
        "matrix": {},
        "legend": { "left": "center", "top": 10, "right": 0 }
    }));

    let next = apply(
        &base,
        Mutation::ReparentElement {
            path: "legend".parse().unwrap(),
            target: Target::Matrix,
        },
    )
    .unwrap();

    assert_eq!(
        next.get("legend"),
        Some(&json!({ "coordinateSystem": "matrix", "coord": [0, 0] }))
    );
}

#[test]
fn test_reparent_to_same_parent_is_noop() {
    let base = doc(json!({ "matrix": {}, "title": { "coordinateSystem": "matrix", "coord": [1, 0] } }));
    let result = apply(
        &base,
        Mutation::ReparentElement {
            path: "title".parse().unwrap(),
            target: Target::Matrix,
        },
    );

    let error = result.unwrap_err();
    assert!(error.is_noop());
}

#[test]
fn test_reparent_matrix_is_rejected() {
    let result = apply(
        &matrix_doc(),
        Mutation::ReparentElement {
            path: "matrix".parse().unwrap(),
            target: Target::Root,
        },
    );

    assert!(matches!(result, Err(MutationError::InvalidTarget { .. })));
}

#[test]
fn test_reparent_to_missing_grid_is_rejected() {
    let base = doc(json!({ "grid": [{}], "xAxis": [{}] }));
    let result = apply(
        &base,
        Mutation::ReparentElement {
            path: "xAxis.0".parse().unwrap(),
            target: Target::Grid(3),
        },
    );

    assert_eq!(result, Err(MutationError::TargetNotFound("grid.3".to_string())));
}

#[test]
fn test_remove_renumbers_siblings() {
    let base = doc(json!({ "series": [{ "name": "a" }, { "name": "b" }, { "name": "c" }] }));
    let next = apply(
        &base,
        Mutation::RemoveElement {
            path: "series.1".into(),
        },
    )
    .unwrap();

    assert_eq!(next.get("series.1.name"), Some(&json!("c")));
    assert_eq!(next.count(Slot::Series), 2);
}

#[test]
fn test_remove_nested_property() {
    let base = doc(json!({ "series": [{ "label": { "show": true, "color": "red" } }] }));
    let next = apply(
        &base,
        Mutation::RemoveElement {
            path: "series.0.label.color".into(),
        },
    )
    .unwrap();

    assert_eq!(next.get("series.0.label"), Some(&json!({ "show": true })));
}

#[test]
fn test_update_creates_intermediates() {
    let next = apply(
        &Document::new(),
        Mutation::UpdateProperty {
            path: "title.textStyle.color".into(),
            value: Some(json!("#fff")),
        },
    )
    .unwrap();

    assert_eq!(next.get("title"), Some(&json!({ "textStyle": { "color": "#fff" } })));
}

#[test]
fn test_update_past_array_end_is_rejected() {
    let mut session = EditSession::new(
        doc(json!({ "series": [{ "type": "line" }] })),
        EditorConfig::default(),
    );
    let before = session.document().clone();

    for path in [
        "series.18446744073709551615.name",
        "series.18446744073709551615",
        "series.4000000000",
        "series.2",
    ] {
        let outcome = session.dispatch(Mutation::UpdateProperty {
            path: path.into(),
            value: Some(json!("x")),
        });
        assert_eq!(
            outcome,
            CommandOutcome::Rejected(MutationError::InvalidPath(path.to_string()))
        );
    }
    assert_eq!(session.document(), &before);

    let appended = session.dispatch(Mutation::UpdateProperty {
        path: "series.1".into(),
        value: Some(json!({ "type": "bar" })),
    });
    assert!(appended.is_applied());
    assert_eq!(session.document().count(Slot::Series), 2);
}

#[test]
fn test_batched_updates_are_atomic() {
    let base = doc(json!({ "title": { "text": "A" } }));
    let result = apply(
        &base,
        Mutation::UpdateProperties {
            updates: vec![
                PropertyUpdate::new("title.text", Some(json!("B"))),
                PropertyUpdate::new("title.text.inner", Some(json!(1))),
            ],
        },
    );

    assert!(matches!(result, Err(MutationError::InvalidPath(_))));
    assert_eq!(base.get("title.text"), Some(&json!("A")));
}

#[test]
fn test_set_data_source_rejects_non_series() {
    let result = apply(
        &doc(json!({ "dataset": [{}], "title": {} })),
        Mutation::SetDataSource {
            path: "title".parse().unwrap(),
            source: chartdoc_editor::DataSource::Dataset(0),
        },
    );

    assert_eq!(result, Err(MutationError::NotASeries("title".to_string())));
}

#[test]
fn test_mutations_deserialize_from_json() {
    let mutations: Vec<Mutation> = serde_json::from_value(json!([
        { "action": "toggleVisibility", "path": "legend" },
        { "action": "insertMatrixLine", "axis": "row", "index": 2 },
        { "action": "mergeCells", "selection": { "colStart": 0, "rowStart": 0, "colEnd": 1, "rowEnd": 1 } },
        { "action": "setDataSource", "path": "series.0", "source": { "dataset": 1 } },
        { "action": "reparentElement", "path": "xAxis.1", "target": "grid.2" },
        { "action": "updateProperty", "path": "title.text" }
    ]))
    .unwrap();

    let names: Vec<_> = mutations.iter().map(Mutation::name).collect();
    assert_eq!(
        names,
        vec![
            "toggleVisibility",
            "insertMatrixLine",
            "mergeCells",
            "setDataSource",
            "reparentElement",
            "updateProperty"
        ]
    );
    assert_eq!(
        mutations[5],
        Mutation::UpdateProperty {
            path: "title.text".into(),
            value: None
        }
    );
}
