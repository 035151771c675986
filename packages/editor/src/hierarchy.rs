//! # Hierarchy Deriver
//!
//! Builds the display tree from the flat document by resolving positional
//! cross-references:
//!
//! ```text
//! Matrix System
//! ├── matrix-placed grids (with their axes and series)
//! └── entities stamped with coordinateSystem: matrix
//! Grid N            (grids outside the matrix)
//! ├── axes          (via gridIndex)
//! └── series        (via xAxisIndex → axis.gridIndex)
//! everything else   (slot processing order)
//! ```
//!
//! Derivation is a pure function of the document. Dangling references never
//! fail: an axis or series whose index points past the end of its target
//! falls back to the first grid, or becomes a root node when there is none.

use chartdoc_document::{
    AxisDim, AxisRef, CoordinateSystem, Document, EntityFields, EntityKind, EntityPath,
    EntityRef, GridRef, MatrixCoord, Slot,
};
use serde::{Deserialize, Serialize};

/// One node of the display tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNode {
    pub path: EntityPath,
    pub label: String,
    pub children: Vec<DisplayNode>,
    pub is_matrix_child: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coord: Option<MatrixCoord>,
    /// Short annotation: `[c,r]` for matrix children, `(X)`/`(Y)` for axes in a grid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    pub can_reparent: bool,
    pub visible: bool,
}

impl DisplayNode {
    fn leaf(entity: &EntityRef<'_>) -> Self {
        let slot = entity.path.slot;
        let label = entity
            .fields
            .label()
            .unwrap_or_else(|| format!("{} {}", slot, entity.path.position() + 1));

        Self {
            path: entity.path,
            label,
            children: Vec::new(),
            is_matrix_child: false,
            coord: None,
            meta: None,
            can_reparent: matches!(
                slot,
                Slot::Series | Slot::Title | Slot::XAxis | Slot::YAxis
            ),
            visible: entity.fields.is_visible(),
        }
    }

    /// Node id; equal to the entity path
    pub fn id(&self) -> String {
        self.path.to_string()
    }

    pub fn slot(&self) -> Slot {
        self.path.slot
    }

    /// Depth-first search for the node at `path`
    pub fn find(&self, path: &EntityPath) -> Option<&DisplayNode> {
        if &self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

/// Where an entity sits in the display tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Matrix,
    Grid(GridRef),
    Unassigned,
}

/// Resolve the placement of a non-grid entity
pub fn placement_of(doc: &Document, entity: &EntityRef<'_>) -> Placement {
    let fields = entity.fields;

    if fields.in_matrix() && doc.matrix().is_some() {
        return Placement::Matrix;
    }

    match entity.kind() {
        EntityKind::Axis(_) => grid_or_first(doc, GridRef::of_axis(fields)),
        EntityKind::Series(_) => match fields.coordinate_system() {
            None | Some(CoordinateSystem::Cartesian2d) => {
                let axis = AxisRef::of_series(fields, AxisDim::X);
                let grid = axis.grid(doc).unwrap_or(GridRef(0));
                grid_or_first(doc, grid)
            }
            Some(_) => Placement::Unassigned,
        },
        _ => Placement::Unassigned,
    }
}

/// Placement of the entity at `path`, if it exists
pub fn placement_at(doc: &Document, path: &EntityPath) -> Option<Placement> {
    let fields = doc.entity(path)?;
    let entity = EntityRef { path: *path, fields };

    if path.slot == Slot::Grid {
        return Some(if fields.in_matrix() && doc.matrix().is_some() {
            Placement::Matrix
        } else {
            Placement::Unassigned
        });
    }
    Some(placement_of(doc, &entity))
}

fn grid_or_first(doc: &Document, grid: GridRef) -> Placement {
    if grid.resolve(doc).is_some() {
        Placement::Grid(grid)
    } else if GridRef(0).resolve(doc).is_some() {
        Placement::Grid(GridRef(0))
    } else {
        Placement::Unassigned
    }
}

fn coord_meta(coord: Option<MatrixCoord>) -> Option<String> {
    coord.map(|coord| coord.to_string())
}

/// Derive the display tree of a document
pub fn derive_hierarchy(doc: &Document) -> Vec<DisplayNode> {
    let mut matrix_node = doc.matrix().map(|matrix| DisplayNode {
        path: EntityPath::single(Slot::Matrix),
        label: "Matrix System".to_string(),
        children: Vec::new(),
        is_matrix_child: false,
        coord: None,
        meta: None,
        can_reparent: false,
        visible: matrix.is_visible(),
    });

    let mut grid_nodes: Vec<DisplayNode> = doc
        .entities(Slot::Grid)
        .iter()
        .map(|grid| {
            let is_matrix_child = grid.fields.in_matrix();
            let coord = grid.fields.matrix_coord();
            DisplayNode {
                label: grid
                    .fields
                    .get("name")
                    .and_then(|name| name.as_str())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Grid {}", grid.path.position() + 1)),
                is_matrix_child,
                coord,
                meta: if is_matrix_child { coord_meta(coord) } else { None },
                can_reparent: true,
                ..DisplayNode::leaf(grid)
            }
        })
        .collect();

    let mut unassigned = Vec::new();

    for slot in Slot::PROCESSING_ORDER {
        for entity in doc.entities(slot) {
            let mut node = DisplayNode::leaf(&entity);

            match placement_of(doc, &entity) {
                Placement::Matrix => {
                    node.is_matrix_child = true;
                    node.coord = entity.fields.matrix_coord();
                    node.meta = coord_meta(node.coord);
                    if let Some(matrix) = matrix_node.as_mut() {
                        matrix.children.push(node);
                    }
                }
                Placement::Grid(grid) => {
                    if let Some(dim) = AxisDim::from_slot(slot) {
                        node.meta = Some(match dim {
                            AxisDim::X => "(X)".to_string(),
                            AxisDim::Y => "(Y)".to_string(),
                        });
                    }
                    match grid_nodes.get_mut(grid.0) {
                        Some(parent) => parent.children.push(node),
                        None => unassigned.push(node),
                    }
                }
                Placement::Unassigned => unassigned.push(node),
            }
        }
    }

    // Axes before series; sort_by_key is stable
    for grid in &mut grid_nodes {
        grid.children.sort_by_key(|child| !child.slot().is_axis());
    }

    let mut roots = Vec::with_capacity(grid_nodes.len() + unassigned.len() + 1);
    let mut root_grids = Vec::new();

    for grid in grid_nodes {
        match matrix_node.as_mut() {
            Some(matrix) if grid.is_matrix_child => matrix.children.push(grid),
            _ => root_grids.push(grid),
        }
    }

    if let Some(matrix) = matrix_node {
        roots.push(matrix);
    }
    roots.extend(root_grids);
    roots.extend(unassigned);

    tracing::trace!(roots = roots.len(), "derived hierarchy");
    roots
}

/// Find a node anywhere in a derived tree
pub fn find_node<'a>(roots: &'a [DisplayNode], path: &EntityPath) -> Option<&'a DisplayNode> {
    roots.iter().find_map(|root| root.find(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_document_has_no_nodes() {
        assert!(derive_hierarchy(&Document::new()).is_empty());
    }

    #[test]
    fn test_series_resolves_through_axis_to_grid() {
        let d = doc(json!({
            "grid": [{}, {}],
            "xAxis": [{ "gridIndex": 0 }, { "gridIndex": 1 }],
            "series": [{ "type": "line", "xAxisIndex": 1 }]
        }));

        let tree = derive_hierarchy(&d);
        assert_eq!(tree.len(), 2);
        let second = &tree[1];
        assert_eq!(second.label, "Grid 2");
        assert_eq!(second.children[0].id(), "xAxis.1");
        assert_eq!(second.children[0].meta.as_deref(), Some("(X)"));
        assert_eq!(second.children[1].id(), "series.0");
    }

    #[test]
    fn test_matrix_grid_without_matrix_stays_at_root() {
        let d = doc(json!({ "grid": [{ "coordinateSystem": "matrix", "coord": [1, 1] }] }));
        let tree = derive_hierarchy(&d);

        assert_eq!(tree.len(), 1);
        assert!(tree[0].is_matrix_child);
        assert_eq!(tree[0].meta.as_deref(), Some("[1,1]"));
    }

    #[test]
    fn test_labels_fall_back_to_slot_and_position() {
        let d = doc(json!({
            "legend": {},
            "dataZoom": [{ "id": "zoom" }, {}]
        }));
        let labels: Vec<_> = derive_hierarchy(&d).into_iter().map(|n| n.label).collect();

        assert_eq!(labels, vec!["legend 1", "zoom", "dataZoom 2"]);
    }

    #[test]
    fn test_placement_at_for_grids() {
        let d = doc(json!({
            "matrix": {},
            "grid": [{ "coordinateSystem": "matrix" }, {}]
        }));

        assert_eq!(placement_at(&d, &"grid.0".parse().unwrap()), Some(Placement::Matrix));
        assert_eq!(placement_at(&d, &"grid.1".parse().unwrap()), Some(Placement::Unassigned));
        assert_eq!(placement_at(&d, &"grid.2".parse().unwrap()), None);
    }
}
