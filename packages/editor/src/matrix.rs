//! # Matrix Layout Editor
//!
//! Spreadsheet-style editing of the matrix coordinate space: merging and
//! unmerging rectangular cell ranges, and inserting or deleting whole rows
//! and columns.
//!
//! Structural edits re-index every dependent coordinate in one pass over the
//! working copy: entity `coord` pairs, merge region ranges, and point-addressed
//! body items. The caller's document is untouched if an edit fails.

use crate::mutations::MutationError;
use chartdoc_document::visitor::for_each_entity_mut;
use chartdoc_document::{Document, EntityFields, EntityPath, Fields, MatrixCoord, Slot};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Which matrix dimension an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatrixAxis {
    Column,
    Row,
}

impl MatrixAxis {
    /// Matrix field holding the label array of this dimension
    pub fn key(self) -> &'static str {
        match self {
            MatrixAxis::Column => "x",
            MatrixAxis::Row => "y",
        }
    }

    fn component(self) -> usize {
        match self {
            MatrixAxis::Column => 0,
            MatrixAxis::Row => 1,
        }
    }
}

impl fmt::Display for MatrixAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixAxis::Column => f.write_str("column"),
            MatrixAxis::Row => f.write_str("row"),
        }
    }
}

/// Inclusive rectangular cell range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSelection {
    pub col_start: usize,
    pub row_start: usize,
    pub col_end: usize,
    pub row_end: usize,
}

impl CellSelection {
    /// Selection spanning two corner cells in any order
    pub fn new(col_a: usize, row_a: usize, col_b: usize, row_b: usize) -> Self {
        Self {
            col_start: col_a.min(col_b),
            row_start: row_a.min(row_b),
            col_end: col_a.max(col_b),
            row_end: row_a.max(row_b),
        }
    }

    pub fn cell(col: usize, row: usize) -> Self {
        Self::new(col, row, col, row)
    }

    /// Same selection with start <= end on both axes
    pub fn normalized(self) -> Self {
        Self::new(self.col_start, self.row_start, self.col_end, self.row_end)
    }

    pub fn is_single_cell(&self) -> bool {
        self.col_start == self.col_end && self.row_start == self.row_end
    }

    fn as_region(&self) -> MergeRegion {
        MergeRegion {
            cols: [self.col_start, self.col_end],
            rows: [self.row_start, self.row_end],
        }
    }
}

/// A merged span of cells, stored as `coord: [[c1, c2], [r1, r2]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRegion {
    pub cols: [usize; 2],
    pub rows: [usize; 2],
}

impl MergeRegion {
    pub fn new(cols: [usize; 2], rows: [usize; 2]) -> Self {
        Self { cols, rows }
    }

    pub fn from_coord(coord: &Value) -> Option<Self> {
        match coord.as_array()?.as_slice() {
            [cols, rows] => Some(Self {
                cols: read_range(cols)?,
                rows: read_range(rows)?,
            }),
            _ => None,
        }
    }

    pub fn to_coord(self) -> Value {
        json!([self.cols, self.rows])
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        (self.cols[0]..=self.cols[1]).contains(&col) && (self.rows[0]..=self.rows[1]).contains(&row)
    }

    pub fn top_left(&self) -> MatrixCoord {
        MatrixCoord::new(self.cols[0], self.rows[0])
    }

    /// Whether the cell is covered by this region without being its live cell
    pub fn hides(&self, col: usize, row: usize) -> bool {
        self.contains(col, row) && MatrixCoord::new(col, row) != self.top_left()
    }

    pub fn intersects(&self, other: &MergeRegion) -> bool {
        self.cols[0].max(other.cols[0]) <= self.cols[1].min(other.cols[1])
            && self.rows[0].max(other.rows[0]) <= self.rows[1].min(other.rows[1])
    }

    pub fn within(&self, other: &MergeRegion) -> bool {
        self.cols[0] >= other.cols[0]
            && self.cols[1] <= other.cols[1]
            && self.rows[0] >= other.rows[0]
            && self.rows[1] <= other.rows[1]
    }

    fn union(&self, other: &MergeRegion) -> MergeRegion {
        MergeRegion {
            cols: [self.cols[0].min(other.cols[0]), self.cols[1].max(other.cols[1])],
            rows: [self.rows[0].min(other.rows[0]), self.rows[1].max(other.rows[1])],
        }
    }

    pub fn col_span(&self) -> usize {
        self.cols[1] - self.cols[0] + 1
    }

    pub fn row_span(&self) -> usize {
        self.rows[1] - self.rows[0] + 1
    }
}

impl fmt::Display for MergeRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[{},{}],[{},{}]]",
            self.cols[0], self.cols[1], self.rows[0], self.rows[1]
        )
    }
}

fn read_range(value: &Value) -> Option<[usize; 2]> {
    match value.as_array()?.as_slice() {
        [a, b] => {
            let a = usize::try_from(a.as_u64()?).ok()?;
            let b = usize::try_from(b.as_u64()?).ok()?;
            Some([a.min(b), a.max(b)])
        }
        _ => None,
    }
}

/// Visible cell with the span it occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSpan {
    pub col: usize,
    pub row: usize,
    pub col_span: usize,
    pub row_span: usize,
}

/// Entity stamped at a matrix cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellComponent {
    pub path: EntityPath,
    pub label: String,
}

// ---------------------------------------------------------------
// Queries
// ---------------------------------------------------------------

fn body_items(doc: &Document) -> &[Value] {
    doc.get("matrix.body.data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn is_merge_item(item: &Value) -> bool {
    item.get("mergeCells").and_then(Value::as_bool) == Some(true)
}

/// Every merge region in `matrix.body.data`, in storage order
pub fn merge_regions(doc: &Document) -> Vec<MergeRegion> {
    body_items(doc)
        .iter()
        .filter(|item| is_merge_item(item))
        .filter_map(|item| item.get("coord").and_then(MergeRegion::from_coord))
        .collect()
}

/// Column and row count; a missing or empty label array counts as `default_size`
pub fn dimensions(doc: &Document, default_size: usize) -> (usize, usize) {
    let count = |axis: MatrixAxis| {
        doc.get(format!("matrix.{}.data", axis.key()))
            .and_then(Value::as_array)
            .map(Vec::len)
            .filter(|len| *len > 0)
            .unwrap_or(default_size)
    };
    (count(MatrixAxis::Column), count(MatrixAxis::Row))
}

/// The merge region covering a cell, if any
pub fn region_at(doc: &Document, col: usize, row: usize) -> Option<MergeRegion> {
    merge_regions(doc)
        .into_iter()
        .find(|region| region.contains(col, row))
}

/// A cell is hidden when a merge region covers it and it is not the region's
/// top-left cell
pub fn is_cell_hidden(doc: &Document, col: usize, row: usize) -> bool {
    region_at(doc, col, row).is_some_and(|region| region.hides(col, row))
}

/// Visible cells in row-major order with their spans; hidden cells are skipped
pub fn cell_layout(doc: &Document, default_size: usize) -> Vec<CellSpan> {
    let (cols, rows) = dimensions(doc, default_size);
    let regions = merge_regions(doc);
    let mut cells = Vec::with_capacity(cols * rows);

    for row in 0..rows {
        for col in 0..cols {
            match regions.iter().find(|region| region.contains(col, row)) {
                Some(region) if region.hides(col, row) => continue,
                Some(region) => cells.push(CellSpan {
                    col,
                    row,
                    col_span: region.col_span(),
                    row_span: region.row_span(),
                }),
                None => cells.push(CellSpan {
                    col,
                    row,
                    col_span: 1,
                    row_span: 1,
                }),
            }
        }
    }
    cells
}

/// Entities whose matrix `coord` is exactly `(col, row)`
pub fn components_at(doc: &Document, col: usize, row: usize) -> Vec<CellComponent> {
    let target = MatrixCoord::new(col, row);
    let mut found = Vec::new();

    for slot in [Slot::Series, Slot::Grid, Slot::Title, Slot::Legend, Slot::Graphic, Slot::Timeline] {
        for entity in doc.entities(slot) {
            let fields = entity.fields;
            if !fields.in_matrix() || fields.matrix_coord() != Some(target) {
                continue;
            }
            let label = fields
                .label()
                .or_else(|| fields.type_name().map(str::to_string))
                .unwrap_or_else(|| format!("{} {}", slot, entity.path.position()));
            found.push(CellComponent {
                path: entity.path,
                label,
            });
        }
    }
    found
}

/// Spreadsheet column label: `A`..`Z`, `AA`, `AB`, ...
pub fn column_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut i = index + 1;
    while i > 0 {
        let rem = (i - 1) % 26;
        label.push(b'A' + rem as u8);
        i = (i - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

// ---------------------------------------------------------------
// Edits
// ---------------------------------------------------------------

fn matrix_or_err(doc: &mut Document) -> Result<&mut Fields, MutationError> {
    doc.matrix_mut().ok_or(MutationError::NoMatrix)
}

fn body_data_mut(matrix: &mut Fields) -> &mut Vec<Value> {
    let body = matrix
        .entry("body")
        .or_insert_with(|| json!({}));
    if !body.is_object() {
        *body = json!({});
    }
    let data = &mut body["data"];
    if !data.is_array() {
        *data = Value::Array(Vec::new());
    }
    match data {
        Value::Array(items) => items,
        _ => unreachable!("body.data was just made an array"),
    }
}

/// Merge a selection into one region.
///
/// The selection first grows to the bounding box of every region it touches,
/// so merging never leaves overlapping regions behind. Regions inside the
/// grown selection are replaced by the new one.
pub fn merge_cells(
    doc: &mut Document,
    selection: CellSelection,
    item_style: &Fields,
) -> Result<MergeRegion, MutationError> {
    let selection = selection.normalized();
    if selection.is_single_cell() {
        return Err(MutationError::SingleCell);
    }

    let existing = merge_regions(doc);
    let mut region = selection.as_region();
    loop {
        let grown = existing
            .iter()
            .filter(|other| other.intersects(&region))
            .fold(region, |acc, other| acc.union(other));
        if grown == region {
            break;
        }
        region = grown;
    }

    if existing.contains(&region) {
        return Err(MutationError::AlreadyMerged);
    }

    let matrix = matrix_or_err(doc)?;
    let data = body_data_mut(matrix);
    data.retain(|item| {
        !(is_merge_item(item)
            && item
                .get("coord")
                .and_then(MergeRegion::from_coord)
                .is_some_and(|other| other.within(&region)))
    });
    data.push(json!({
        "coord": region.to_coord(),
        "mergeCells": true,
        "itemStyle": item_style
    }));

    tracing::debug!(?region, "merged cells");
    Ok(region)
}

/// Remove every merge region that intersects the selection
pub fn unmerge_cells(doc: &mut Document, selection: CellSelection) -> Result<usize, MutationError> {
    let selection = selection.normalized().as_region();
    let matrix = matrix_or_err(doc)?;
    let data = body_data_mut(matrix);

    let before = data.len();
    data.retain(|item| {
        !(is_merge_item(item)
            && item
                .get("coord")
                .and_then(MergeRegion::from_coord)
                .is_some_and(|region| region.intersects(&selection)))
    });

    let removed = before - data.len();
    if removed == 0 {
        return Err(MutationError::NothingToUnmerge);
    }
    Ok(removed)
}

#[derive(Debug, Clone, Copy)]
enum LineEdit {
    Insert(usize),
    Delete(usize),
}

impl LineEdit {
    /// New position of a point coordinate
    fn shift_point(self, value: usize) -> usize {
        match self {
            LineEdit::Insert(index) if value >= index => value + 1,
            LineEdit::Delete(index) if value == index => index.saturating_sub(1),
            LineEdit::Delete(index) if value > index => value - 1,
            _ => value,
        }
    }

    /// New bounds of a range, `None` when it collapses
    fn remap_range(self, [start, end]: [usize; 2]) -> Option<[usize; 2]> {
        match self {
            LineEdit::Insert(index) if start >= index => Some([start + 1, end + 1]),
            LineEdit::Insert(index) if index <= end => Some([start, end + 1]),
            LineEdit::Delete(index) if start > index => Some([start - 1, end - 1]),
            LineEdit::Delete(index) if index <= end => {
                if end == start {
                    None
                } else {
                    Some([start, end - 1])
                }
            }
            _ => Some([start, end]),
        }
    }
}

/// Insert an empty row or column before `index`
pub fn insert_line(
    doc: &mut Document,
    axis: MatrixAxis,
    index: usize,
    default_size: usize,
) -> Result<(), MutationError> {
    edit_line(doc, axis, LineEdit::Insert(index), default_size)
}

/// Delete the row or column at `index`; the last one cannot be deleted
pub fn delete_line(
    doc: &mut Document,
    axis: MatrixAxis,
    index: usize,
    default_size: usize,
) -> Result<(), MutationError> {
    edit_line(doc, axis, LineEdit::Delete(index), default_size)
}

fn edit_line(
    doc: &mut Document,
    axis: MatrixAxis,
    edit: LineEdit,
    default_size: usize,
) -> Result<(), MutationError> {
    let (cols, rows) = dimensions(doc, default_size);
    let matrix = matrix_or_err(doc)?;

    // Materialize both label arrays so the count survives the edit
    for (dim, count) in [(MatrixAxis::Column, cols), (MatrixAxis::Row, rows)] {
        let labels = matrix.entry(dim.key()).or_insert_with(|| json!({}));
        if !labels.is_object() {
            *labels = json!({});
        }
        let data = &mut labels["data"];
        if data.as_array().map_or(true, Vec::is_empty) {
            *data = Value::Array(vec![Value::Null; count]);
        }
    }

    let labels = match &mut matrix[axis.key()]["data"] {
        Value::Array(labels) => labels,
        _ => unreachable!("label array was just materialized"),
    };
    let count = labels.len();

    match edit {
        LineEdit::Insert(index) => {
            if index > count {
                return Err(MutationError::LineOutOfRange { axis, index, count });
            }
            labels.insert(index, Value::Null);
        }
        LineEdit::Delete(index) => {
            if count <= 1 {
                return Err(MutationError::LastLine(axis));
            }
            if index >= count {
                return Err(MutationError::LineOutOfRange { axis, index, count });
            }
            labels.remove(index);
        }
    }

    let component = axis.component();
    let data = body_data_mut(matrix);
    let items = std::mem::take(data);
    *data = items
        .into_iter()
        .filter_map(|mut item| {
            let Some(coord) = item.get("coord") else {
                return Some(item);
            };
            if let Some(mut region) = MergeRegion::from_coord(coord) {
                let range = match axis {
                    MatrixAxis::Column => &mut region.cols,
                    MatrixAxis::Row => &mut region.rows,
                };
                *range = edit.remap_range(*range)?;
                item["coord"] = region.to_coord();
            } else if let Some(point) = MatrixCoord::from_value(coord) {
                item["coord"] = shift_coord(point, component, edit).to_value();
            }
            Some(item)
        })
        .collect();

    let mut shifted = 0usize;
    for_each_entity_mut(doc, |_, fields| {
        if !fields.in_matrix() {
            return;
        }
        if let Some(point) = fields.matrix_coord() {
            fields.insert(
                "coord".to_string(),
                shift_coord(point, component, edit).to_value(),
            );
            shifted += 1;
        }
    });

    tracing::debug!(%axis, ?edit, shifted, "edited matrix line");
    Ok(())
}

fn shift_coord(point: MatrixCoord, component: usize, edit: LineEdit) -> MatrixCoord {
    match component {
        0 => MatrixCoord::new(edit.shift_point(point.col), point.row),
        _ => MatrixCoord::new(point.col, edit.shift_point(point.row)),
    }
}
