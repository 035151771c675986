//! Node lifecycle operations that change where an entity lives: adding a
//! new element under a parent, and moving an existing one between the
//! matrix, a grid, and the document root.
//!
//! A cartesian series can only be drawn through an x/y axis pair on a grid,
//! so placing one in the matrix wraps it in a fresh matrix-placed grid with
//! its own axes. Detaching one rebuilds a default grid and axes when the
//! document has none.

use crate::hierarchy::{placement_at, Placement};
use crate::mutations::{MutationError, Target};
use chartdoc_document::defaults::element_default;
use chartdoc_document::refs::first_axis_on_grid;
use chartdoc_document::{
    AxisDim, CoordinateSystem, Document, ElementKind, EntityFields, EntityKind, EntityPath,
    Fields, GridRef, MatrixCoord, SeriesType, Slot,
};
use serde_json::{json, Value};

/// Absolute positioning fields; mutually exclusive with matrix placement
const POSITIONING: [&str; 4] = ["left", "top", "right", "bottom"];

/// Keys of initial values that are consumed by matrix placement
const MATRIX_KEYS: [&str; 2] = ["coord", "coordinateSystem"];

fn strip_positioning(fields: &mut Fields) {
    for key in POSITIONING {
        fields.remove(key);
    }
}

fn merge_initial(element: &mut Fields, initial: Option<&Fields>, skip: &[&str]) {
    for (key, value) in initial.into_iter().flatten() {
        if !skip.contains(&key.as_str()) {
            element.insert(key.clone(), value.clone());
        }
    }
}

fn set(fields: &mut Fields, key: &str, value: impl Into<Value>) {
    fields.insert(key.to_string(), value.into());
}

fn object(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        _ => Fields::new(),
    }
}

/// Append a matrix-placed grid at `coord` plus an axis pair bound to it.
/// Returns the positions of the new x and y axes.
fn attach_matrix_grid(doc: &mut Document, coord: MatrixCoord, boundary_gap: bool) -> (usize, usize) {
    let mut grid = element_default(&ElementKind::new(Slot::Grid));
    strip_positioning(&mut grid);
    set(&mut grid, "coordinateSystem", CoordinateSystem::MATRIX);
    set(&mut grid, "coord", coord.to_value());
    set(&mut grid, "containLabel", true);
    set(&mut grid, "show", false);

    let grid_index = doc.push_entity(Slot::Grid, grid).position();
    let x = doc.push_entity(
        Slot::XAxis,
        object(json!({
            "type": "category",
            "gridIndex": grid_index,
            "show": true,
            "boundaryGap": boundary_gap
        })),
    );
    let y = doc.push_entity(
        Slot::YAxis,
        object(json!({ "type": "value", "gridIndex": grid_index, "show": true })),
    );

    tracing::debug!(grid_index, %coord, "attached matrix grid");
    (x.position(), y.position())
}

/// Create a default grid and axes for any that are missing entirely
fn ensure_cartesian_support(doc: &mut Document) {
    for slot in [Slot::Grid, Slot::XAxis, Slot::YAxis] {
        if doc.count(slot) == 0 {
            let path = doc.push_entity(slot, element_default(&ElementKind::new(slot)));
            tracing::debug!(%path, "created missing cartesian dependency");
        }
    }
}

/// Point a series at the first axes bound to `grid` (position 0 when none)
fn wire_to_grid(doc: &Document, series: &mut Fields, grid: GridRef) {
    for dim in [AxisDim::X, AxisDim::Y] {
        let index = first_axis_on_grid(doc, dim, grid).map_or(0, |axis| axis.index);
        set(series, dim.index_key(), index);
    }
    set(series, "coordinateSystem", CoordinateSystem::CARTESIAN_2D);
    series.remove("coord");
}

fn require_matrix(doc: &Document) -> Result<(), MutationError> {
    match doc.matrix() {
        Some(_) => Ok(()),
        None => Err(MutationError::TargetNotFound(Target::Matrix.to_string())),
    }
}

fn require_grid(doc: &Document, grid: GridRef) -> Result<(), MutationError> {
    match grid.resolve(doc) {
        Some(_) => Ok(()),
        None => Err(MutationError::TargetNotFound(Target::Grid(grid.0).to_string())),
    }
}

/// Add a new element of `kind` under `parent` and return its path.
///
/// Series are bound to the first dataset when one exists instead of
/// carrying inline rows.
pub fn add_element(
    doc: &mut Document,
    kind: &ElementKind,
    parent: Option<Target>,
    initial: Option<&Fields>,
) -> Result<EntityPath, MutationError> {
    if kind.slot == Slot::Matrix && doc.matrix().is_some() {
        return Err(MutationError::MatrixExists);
    }

    let mut element = element_default(kind);
    if kind.slot == Slot::Series && doc.count(Slot::Dataset) > 0 {
        set(&mut element, "datasetIndex", 0);
        element.remove("data");
    }

    let coord = initial
        .and_then(|values| values.get("coord"))
        .and_then(MatrixCoord::from_value)
        .unwrap_or(MatrixCoord::new(0, 0));
    let cartesian = kind.is_cartesian_series();
    let target = parent.unwrap_or(Target::Root);
    let invalid = || MutationError::InvalidTarget {
        subject: kind.to_string(),
        target: target.to_string(),
    };

    let mut wrapped = false;
    match target {
        Target::Matrix => {
            require_matrix(doc)?;
            if cartesian {
                let bar = kind.series_type() == Some(SeriesType::Bar);
                let (x, y) = attach_matrix_grid(doc, coord, bar);
                set(&mut element, "xAxisIndex", x);
                set(&mut element, "yAxisIndex", y);
                set(&mut element, "coordinateSystem", CoordinateSystem::CARTESIAN_2D);
                merge_initial(&mut element, initial, &MATRIX_KEYS);
                wrapped = true;
            } else if kind.slot.is_matrix_placeable() {
                merge_initial(&mut element, initial, &MATRIX_KEYS);
                set(&mut element, "coordinateSystem", CoordinateSystem::MATRIX);
                set(&mut element, "coord", coord.to_value());
                strip_positioning(&mut element);
            } else {
                return Err(invalid());
            }
        }
        Target::Grid(index) => {
            let grid = GridRef(index);
            require_grid(doc, grid)?;
            merge_initial(&mut element, initial, &[]);
            match kind.slot {
                Slot::Series => wire_to_grid(doc, &mut element, grid),
                Slot::XAxis | Slot::YAxis => set(&mut element, "gridIndex", index),
                _ => return Err(invalid()),
            }
        }
        Target::Root => merge_initial(&mut element, initial, &[]),
    }

    if cartesian && !wrapped {
        ensure_cartesian_support(doc);
    }

    let path = doc.push_entity(kind.slot, element);
    tracing::debug!(%kind, %path, %target, "added element");
    Ok(path)
}

/// Move an entity to the matrix, a grid, or the document root
pub fn reparent_element(
    doc: &mut Document,
    path: &EntityPath,
    target: Target,
) -> Result<(), MutationError> {
    let fields = doc
        .entity(path)
        .ok_or_else(|| MutationError::EntityNotFound(path.to_string()))?;
    let kind = EntityKind::classify(path.slot, fields.type_name());
    let cartesian = kind.is_cartesian_series();
    let bar = fields.type_name() == Some("bar");
    let existing_coord = fields.matrix_coord();

    let eligible = match (target, &kind) {
        (_, EntityKind::Matrix) => false,
        (Target::Matrix, _) => cartesian || path.slot.is_matrix_placeable(),
        (Target::Grid(_), EntityKind::Series(_) | EntityKind::Axis(_)) => true,
        (Target::Grid(_), _) => false,
        (Target::Root, _) => true,
    };
    if !eligible {
        return Err(MutationError::InvalidTarget {
            subject: path.to_string(),
            target: target.to_string(),
        });
    }

    match target {
        Target::Matrix => require_matrix(doc)?,
        Target::Grid(index) => require_grid(doc, GridRef(index))?,
        Target::Root => {}
    }

    let current = placement_at(doc, path);
    let unchanged = match (target, current) {
        (Target::Matrix, Some(Placement::Matrix)) => true,
        (Target::Grid(index), Some(Placement::Grid(grid))) => grid.0 == index,
        (Target::Root, Some(Placement::Unassigned)) => true,
        _ => false,
    };
    if unchanged {
        return Err(MutationError::SameParent {
            path: path.to_string(),
            target: target.to_string(),
        });
    }

    let missing = || MutationError::EntityNotFound(path.to_string());

    match target {
        Target::Matrix if cartesian => {
            let coord = existing_coord.unwrap_or(MatrixCoord::new(0, 0));
            let (x, y) = attach_matrix_grid(doc, coord, bar);
            let series = doc.entity_mut(path).ok_or_else(missing)?;
            set(series, "coordinateSystem", CoordinateSystem::CARTESIAN_2D);
            set(series, "xAxisIndex", x);
            set(series, "yAxisIndex", y);
            series.remove("coord");
            series.remove("gridIndex");
        }
        Target::Matrix => {
            let entity = doc.entity_mut(path).ok_or_else(missing)?;
            set(entity, "coordinateSystem", CoordinateSystem::MATRIX);
            if existing_coord.is_none() {
                set(entity, "coord", MatrixCoord::new(0, 0).to_value());
            }
            strip_positioning(entity);
            for key in ["xAxisIndex", "yAxisIndex", "gridIndex"] {
                entity.remove(key);
            }
        }
        Target::Grid(index) => {
            if path.slot.is_axis() {
                let axis = doc.entity_mut(path).ok_or_else(missing)?;
                set(axis, "gridIndex", index);
            } else {
                let mut series = doc.entity(path).cloned().ok_or_else(missing)?;
                wire_to_grid(doc, &mut series, GridRef(index));
                *doc.entity_mut(path).ok_or_else(missing)? = series;
            }
        }
        Target::Root => {
            if cartesian {
                ensure_cartesian_support(doc);
            }
            let entity = doc.entity_mut(path).ok_or_else(missing)?;
            for key in MATRIX_KEYS {
                entity.remove(key);
            }

            if cartesian {
                set(entity, "coordinateSystem", CoordinateSystem::CARTESIAN_2D);
                set(entity, "xAxisIndex", 0);
                set(entity, "yAxisIndex", 0);
            } else if path.slot.is_axis() {
                set(entity, "gridIndex", 0);
            }
            if !POSITIONING.iter().any(|key| entity.contains_key(*key)) {
                set(entity, "left", "center");
                set(entity, "top", "center");
            }
        }
    }

    tracing::debug!(%path, %target, "reparented element");
    Ok(())
}
