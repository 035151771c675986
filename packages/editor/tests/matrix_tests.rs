//! Matrix layout editing through mutations

use chartdoc_document::defaults::matrix_default;
use chartdoc_document::Document;
use chartdoc_editor::matrix::{cell_layout, components_at, is_cell_hidden, merge_regions};
use chartdoc_editor::{
    CellSelection, EditorConfig, MatrixAxis, MergeRegion, Mutation, MutationError,
};
use serde_json::{json, Value};

fn with_matrix(cols: usize, rows: usize, body: Value) -> Document {
    let mut matrix = matrix_default(cols, rows);
    matrix["body"]["data"] = body;
    Document::from_value(json!({ "matrix": matrix })).unwrap()
}

fn apply(doc: &Document, mutation: Mutation) -> Result<Document, MutationError> {
    mutation.apply(doc, &EditorConfig::default())
}

fn delete_column(doc: &Document, index: usize) -> Document {
    apply(
        doc,
        Mutation::DeleteMatrixLine {
            axis: MatrixAxis::Column,
            index,
        },
    )
    .unwrap()
}

#[test]
fn test_deleting_inside_a_region_shrinks_it() {
    let doc = with_matrix(5, 2, json!([{ "coord": [[2, 4], [0, 0]], "mergeCells": true }]));

    let next = delete_column(&doc, 3);
    assert_eq!(merge_regions(&next), vec![MergeRegion::new([2, 3], [0, 0])]);
    assert_eq!(next.get("matrix.x.data").and_then(Value::as_array).map(Vec::len), Some(4));
}

#[test]
fn test_deleting_before_a_region_shifts_it() {
    let doc = with_matrix(5, 2, json!([{ "coord": [[2, 4], [0, 0]], "mergeCells": true }]));

    let next = delete_column(&doc, 1);
    assert_eq!(merge_regions(&next), vec![MergeRegion::new([1, 3], [0, 0])]);
}

#[test]
fn test_deleting_a_single_line_region_drops_it() {
    let doc = with_matrix(4, 4, json!([{ "coord": [[1, 1], [0, 2]], "mergeCells": true }]));

    let next = delete_column(&doc, 1);
    assert!(merge_regions(&next).is_empty());
}

#[test]
fn test_inserting_inside_a_region_grows_it() {
    let doc = with_matrix(4, 4, json!([{ "coord": [[0, 1], [1, 2]], "mergeCells": true }]));

    let next = apply(
        &doc,
        Mutation::InsertMatrixLine {
            axis: MatrixAxis::Row,
            index: 2,
        },
    )
    .unwrap();
    assert_eq!(merge_regions(&next), vec![MergeRegion::new([0, 1], [1, 3])]);
    assert_eq!(next.get("matrix.y.data").and_then(Value::as_array).map(Vec::len), Some(5));
}

#[test]
fn test_line_edits_shift_entities_and_points() {
    let mut doc = with_matrix(3, 3, json!([{ "coord": [2, 1], "value": "note" }, { "value": "free" }]));
    doc.set("title", Some(json!({ "coordinateSystem": "matrix", "coord": [2, 2] })));
    doc.set("legend", Some(json!({ "coord": [2, 2] })));

    let next = apply(
        &doc,
        Mutation::InsertMatrixLine {
            axis: MatrixAxis::Column,
            index: 1,
        },
    )
    .unwrap();

    assert_eq!(next.get("title.coord"), Some(&json!([3, 2])));
    // Not in the matrix coordinate space
    assert_eq!(next.get("legend.coord"), Some(&json!([2, 2])));
    assert_eq!(next.get("matrix.body.data.0.coord"), Some(&json!([3, 1])));
    assert_eq!(next.get("matrix.body.data.1"), Some(&json!({ "value": "free" })));
}

#[test]
fn test_line_bounds() {
    let doc = with_matrix(1, 2, json!([]));

    assert_eq!(
        apply(
            &doc,
            Mutation::DeleteMatrixLine {
                axis: MatrixAxis::Column,
                index: 0
            }
        ),
        Err(MutationError::LastLine(MatrixAxis::Column))
    );
    assert_eq!(
        apply(
            &doc,
            Mutation::InsertMatrixLine {
                axis: MatrixAxis::Row,
                index: 3
            }
        ),
        Err(MutationError::LineOutOfRange {
            axis: MatrixAxis::Row,
            index: 3,
            count: 2
        })
    );
}

#[test]
fn test_missing_label_arrays_use_default_size() {
    let doc = Document::from_value(json!({ "matrix": {} })).unwrap();
    let next = apply(
        &doc,
        Mutation::InsertMatrixLine {
            axis: MatrixAxis::Column,
            index: 5,
        },
    )
    .unwrap();

    assert_eq!(next.get("matrix.x.data").and_then(Value::as_array).map(Vec::len), Some(6));
    assert_eq!(next.get("matrix.y.data").and_then(Value::as_array).map(Vec::len), Some(5));
}

#[test]
fn test_merge_then_unmerge_restores_body() {
    let doc = with_matrix(4, 4, json!([]));
    let selection = CellSelection::new(2, 2, 0, 0);

    let merged = apply(&doc, Mutation::MergeCells { selection }).unwrap();
    assert_eq!(merge_regions(&merged), vec![MergeRegion::new([0, 2], [0, 2])]);

    let unmerged = apply(&merged, Mutation::UnmergeCells { selection }).unwrap();
    assert_eq!(unmerged, doc);
}

#[test]
fn test_merged_cells_hide_all_but_top_left() {
    let doc = with_matrix(3, 3, json!([{ "coord": [[0, 1], [0, 1]], "mergeCells": true }]));

    assert!(!is_cell_hidden(&doc, 0, 0));
    assert!(is_cell_hidden(&doc, 1, 0));
    assert!(is_cell_hidden(&doc, 0, 1));
    assert!(is_cell_hidden(&doc, 1, 1));
    assert!(!is_cell_hidden(&doc, 2, 2));

    let layout = cell_layout(&doc, 5);
    assert_eq!(layout.len(), 6);
    assert_eq!((layout[0].col_span, layout[0].row_span), (2, 2));
}

#[test]
fn test_merge_absorbs_overlapping_regions() {
    let doc = with_matrix(5, 5, json!([{ "coord": [[1, 2], [1, 1]], "mergeCells": true }]));

    let next = apply(
        &doc,
        Mutation::MergeCells {
            selection: CellSelection::new(0, 0, 1, 1),
        },
    )
    .unwrap();
    assert_eq!(merge_regions(&next), vec![MergeRegion::new([0, 2], [0, 1])]);
}

#[test]
fn test_merge_noops() {
    let doc = with_matrix(3, 3, json!([{ "coord": [[0, 1], [0, 0]], "mergeCells": true }]));

    let single = apply(
        &doc,
        Mutation::MergeCells {
            selection: CellSelection::cell(2, 2),
        },
    );
    assert_eq!(single, Err(MutationError::SingleCell));

    let again = apply(
        &doc,
        Mutation::MergeCells {
            selection: CellSelection::new(0, 0, 1, 0),
        },
    );
    assert_eq!(again, Err(MutationError::AlreadyMerged));

    let nothing = apply(
        &doc,
        Mutation::UnmergeCells {
            selection: CellSelection::cell(2, 2),
        },
    );
    assert_eq!(nothing, Err(MutationError::NothingToUnmerge));
}

#[test]
fn test_components_at_cell() {
    let doc = Document::from_value(json!({
        "matrix": {},
        "title": [
            { "text": "A", "coordinateSystem": "matrix", "coord": [1, 1] },
            { "text": "B", "coordinateSystem": "matrix", "coord": [1, 2] }
        ],
        "series": [{ "type": "pie", "coordinateSystem": "matrix", "coord": [1, 1] }]
    }))
    .unwrap();

    let labels: Vec<_> = components_at(&doc, 1, 1)
        .into_iter()
        .map(|component| component.label)
        .collect();
    assert_eq!(labels, vec!["pie", "A"]);
}
