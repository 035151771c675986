//! # Document Mutations
//!
//! Intent-level commands against a chart document.
//!
//! Every mutation runs against a working copy of the input document and
//! hands back the edited copy. A failed mutation never leaves a partially
//! edited document behind; the caller simply keeps the original.
//!
//! ## Mutation Semantics
//!
//! ### AddElement / ReparentElement
//! - Placement rules live in [`crate::placement`]
//! - Cartesian series placed in the matrix get a wrapper grid and axis pair
//!
//! ### UpdateProperty
//! - A `null` or missing value deletes the key
//! - Missing intermediate containers are created on the way down
//!
//! ### Matrix line edits
//! - Every dependent coordinate is shifted in the same step

use crate::config::EditorConfig;
use crate::data_binding::{set_data_source, DataSource};
use crate::matrix::{self, CellSelection, MatrixAxis};
use crate::placement::{add_element, reparent_element};
use chartdoc_document::{DocPath, Document, ElementKind, EntityFields, EntityPath, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Destination of an add or reparent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Target {
    Matrix,
    Grid(usize),
    Root,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Matrix => f.write_str("matrix"),
            Target::Grid(index) => write!(f, "grid.{}", index),
            Target::Root => f.write_str("root"),
        }
    }
}

impl FromStr for Target {
    type Err = MutationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "root" => Ok(Target::Root),
            "matrix" => Ok(Target::Matrix),
            "grid" => Ok(Target::Grid(0)),
            other => other
                .strip_prefix("grid.")
                .and_then(|index| index.parse().ok())
                .map(Target::Grid)
                .ok_or_else(|| MutationError::TargetNotFound(other.to_string())),
        }
    }
}

impl TryFrom<String> for Target {
    type Error = MutationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.to_string()
    }
}

/// One entry of a batched property update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    pub path: DocPath,
    #[serde(default)]
    pub value: Option<Value>,
}

impl PropertyUpdate {
    pub fn new(path: impl Into<DocPath>, value: Option<Value>) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

/// Semantic mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Create a new element from its kind defaults
    AddElement {
        kind: ElementKind,
        #[serde(default)]
        parent: Option<Target>,
        #[serde(default)]
        initial: Option<Fields>,
    },

    /// Remove an entity, or any value addressed by path
    RemoveElement { path: DocPath },

    ReparentElement { path: EntityPath, target: Target },

    /// Flip the `show` flag of the object at `path`
    ToggleVisibility { path: DocPath },

    UpdateProperty {
        path: DocPath,
        #[serde(default)]
        value: Option<Value>,
    },

    /// Several updates applied as one edit
    UpdateProperties { updates: Vec<PropertyUpdate> },

    InsertMatrixLine { axis: MatrixAxis, index: usize },

    DeleteMatrixLine { axis: MatrixAxis, index: usize },

    MergeCells { selection: CellSelection },

    UnmergeCells { selection: CellSelection },

    SetDataSource { path: EntityPath, source: DataSource },

    /// Swap in a whole document, e.g. after loading a file
    ReplaceDocument { document: Document },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{subject} cannot be placed under {target}")]
    InvalidTarget { subject: String, target: String },

    #[error("{path} is already under {target}")]
    SameParent { path: String, target: String },

    #[error("Document already has a matrix")]
    MatrixExists,

    #[error("Not a series: {0}")]
    NotASeries(String),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(usize),

    #[error("Document has no matrix")]
    NoMatrix,

    #[error("Cannot delete the last {0}")]
    LastLine(MatrixAxis),

    #[error("{axis} {index} out of range (count {count})")]
    LineOutOfRange {
        axis: MatrixAxis,
        index: usize,
        count: usize,
    },

    #[error("Selection is a single cell")]
    SingleCell,

    #[error("Selection is already merged")]
    AlreadyMerged,

    #[error("No merged cells in selection")]
    NothingToUnmerge,

    #[error("Update list is empty")]
    EmptyUpdate,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No transaction in progress")]
    NoTransaction,
}

impl MutationError {
    /// Rejections that leave the document exactly as it was requested to be
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            MutationError::SameParent { .. }
                | MutationError::SingleCell
                | MutationError::AlreadyMerged
                | MutationError::NothingToUnmerge
                | MutationError::EmptyUpdate
                | MutationError::NothingToUndo
                | MutationError::NothingToRedo
                | MutationError::NoTransaction
        )
    }
}

impl Mutation {
    /// Action name used by the recordable allow-list
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddElement { .. } => "addElement",
            Mutation::RemoveElement { .. } => "removeElement",
            Mutation::ReparentElement { .. } => "reparentElement",
            Mutation::ToggleVisibility { .. } => "toggleVisibility",
            Mutation::UpdateProperty { .. } => "updateProperty",
            Mutation::UpdateProperties { .. } => "updateProperties",
            Mutation::InsertMatrixLine { .. } => "insertMatrixLine",
            Mutation::DeleteMatrixLine { .. } => "deleteMatrixLine",
            Mutation::MergeCells { .. } => "mergeCells",
            Mutation::UnmergeCells { .. } => "unmergeCells",
            Mutation::SetDataSource { .. } => "setDataSource",
            Mutation::ReplaceDocument { .. } => "replaceDocument",
        }
    }

    /// Apply to a copy of `doc` and return the edited copy
    pub fn apply(&self, doc: &Document, config: &EditorConfig) -> Result<Document, MutationError> {
        self.validate(doc)?;

        if let Mutation::ReplaceDocument { document } = self {
            return Ok(document.clone());
        }

        let mut next = doc.clone();
        match self {
            Mutation::AddElement {
                kind,
                parent,
                initial,
            } => {
                add_element(&mut next, kind, *parent, initial.as_ref())?;
            }

            Mutation::RemoveElement { path } => Self::apply_remove(&mut next, path)?,

            Mutation::ReparentElement { path, target } => {
                reparent_element(&mut next, path, *target)?
            }

            Mutation::ToggleVisibility { path } => Self::apply_toggle(&mut next, path)?,

            Mutation::UpdateProperty { path, value } => {
                Self::apply_update(&mut next, path, value.clone())?
            }

            Mutation::UpdateProperties { updates } => {
                for update in updates {
                    Self::apply_update(&mut next, &update.path, update.value.clone())?;
                }
            }

            Mutation::InsertMatrixLine { axis, index } => {
                matrix::insert_line(&mut next, *axis, *index, config.default_matrix_size)?
            }

            Mutation::DeleteMatrixLine { axis, index } => {
                matrix::delete_line(&mut next, *axis, *index, config.default_matrix_size)?
            }

            Mutation::MergeCells { selection } => {
                matrix::merge_cells(&mut next, *selection, &config.merge_item_style)?;
            }

            Mutation::UnmergeCells { selection } => {
                matrix::unmerge_cells(&mut next, *selection)?;
            }

            Mutation::SetDataSource { path, source } => {
                set_data_source(&mut next, path, *source)?
            }

            Mutation::ReplaceDocument { .. } => {}
        }

        Ok(next)
    }

    /// Cheap structural checks that need no working copy
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::ReparentElement { path, .. } | Mutation::SetDataSource { path, .. } => {
                if doc.entity(path).is_none() {
                    return Err(MutationError::EntityNotFound(path.to_string()));
                }
            }

            Mutation::RemoveElement { path } | Mutation::ToggleVisibility { path } => {
                let is_entity =
                    entity_path(path).is_some_and(|entity| doc.entity(&entity).is_some());
                if !is_entity && doc.get(path).is_none() {
                    return Err(MutationError::EntityNotFound(path.to_string()));
                }
            }

            Mutation::UpdateProperty { path, .. } => {
                if path.is_empty() {
                    return Err(MutationError::InvalidPath(path.to_string()));
                }
            }

            Mutation::UpdateProperties { updates } => {
                if updates.is_empty() {
                    return Err(MutationError::EmptyUpdate);
                }
                if let Some(update) = updates.iter().find(|update| update.path.is_empty()) {
                    return Err(MutationError::InvalidPath(update.path.to_string()));
                }
            }

            Mutation::InsertMatrixLine { .. }
            | Mutation::DeleteMatrixLine { .. }
            | Mutation::MergeCells { .. }
            | Mutation::UnmergeCells { .. } => {
                if doc.matrix().is_none() {
                    return Err(MutationError::NoMatrix);
                }
            }

            Mutation::AddElement { .. } | Mutation::ReplaceDocument { .. } => {}
        }

        Ok(())
    }

    fn apply_remove(doc: &mut Document, path: &DocPath) -> Result<(), MutationError> {
        let removed = match entity_path(path) {
            Some(entity) => doc.remove_entity(&entity),
            None => doc.remove(path),
        };

        match removed {
            Some(_) => {
                tracing::debug!(%path, "removed element");
                Ok(())
            }
            None => Err(MutationError::EntityNotFound(path.to_string())),
        }
    }

    fn apply_toggle(doc: &mut Document, path: &DocPath) -> Result<(), MutationError> {
        if let Some(entity) = entity_path(path) {
            if let Some(fields) = doc.entity_mut(&entity) {
                let visible = fields.is_visible();
                fields.insert("show".to_string(), Value::Bool(!visible));
                return Ok(());
            }
        }

        let visible = doc
            .get(path)
            .and_then(Value::as_object)
            .map(|fields| fields.is_visible())
            .ok_or_else(|| MutationError::EntityNotFound(path.to_string()))?;

        if doc.set(path.child("show"), Some(Value::Bool(!visible))) {
            Ok(())
        } else {
            Err(MutationError::InvalidPath(path.to_string()))
        }
    }

    fn apply_update(
        doc: &mut Document,
        path: &DocPath,
        value: Option<Value>,
    ) -> Result<(), MutationError> {
        let value = value.filter(|value| !value.is_null());
        if doc.set(path, value) {
            Ok(())
        } else {
            Err(MutationError::InvalidPath(path.to_string()))
        }
    }
}

/// `slot` or `slot.N` paths address whole entities whatever their storage shape
fn entity_path(path: &DocPath) -> Option<EntityPath> {
    path.to_string().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_target_round_trip() {
        for target in [Target::Matrix, Target::Grid(3), Target::Root] {
            assert_eq!(target.to_string().parse::<Target>(), Ok(target));
        }
        assert_eq!("grid".parse::<Target>(), Ok(Target::Grid(0)));
        assert!("panel".parse::<Target>().is_err());
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation: Mutation = serde_json::from_value(json!({
            "action": "addElement",
            "kind": "series.bar",
            "parent": "matrix",
            "initial": { "coord": [0, 0] }
        }))
        .unwrap();

        assert_eq!(mutation.name(), "addElement");
        assert!(matches!(
            mutation,
            Mutation::AddElement { parent: Some(Target::Matrix), .. }
        ));
    }

    #[test]
    fn test_failed_mutation_leaves_input_untouched() {
        let original = doc(json!({ "title": { "text": "A" } }));
        let mutation = Mutation::RemoveElement {
            path: "series.4".into(),
        };

        let result = mutation.apply(&original, &EditorConfig::default());
        assert_eq!(result, Err(MutationError::EntityNotFound("series.4".to_string())));
        assert_eq!(original.get("title.text"), Some(&json!("A")));
    }

    #[test]
    fn test_update_null_deletes_key() {
        let original = doc(json!({ "title": { "text": "A", "subtext": "B" } }));
        let mutation = Mutation::UpdateProperty {
            path: "title.subtext".into(),
            value: Some(Value::Null),
        };

        let next = mutation.apply(&original, &EditorConfig::default()).unwrap();
        assert_eq!(next.get("title"), Some(&json!({ "text": "A" })));
    }

    #[test]
    fn test_toggle_visibility() {
        let original = doc(json!({ "legend": {} }));
        let mutation = Mutation::ToggleVisibility {
            path: "legend".into(),
        };
        let config = EditorConfig::default();

        let hidden = mutation.apply(&original, &config).unwrap();
        assert_eq!(hidden.get("legend.show"), Some(&json!(false)));

        let shown = mutation.apply(&hidden, &config).unwrap();
        assert_eq!(shown.get("legend.show"), Some(&json!(true)));
    }

    #[test]
    fn test_positional_path_reaches_single_stored_entity() {
        let original = doc(json!({ "series": { "type": "pie" }, "legend": {} }));
        let config = EditorConfig::default();

        let hidden = Mutation::ToggleVisibility {
            path: "series.0".into(),
        }
        .apply(&original, &config)
        .unwrap();
        assert_eq!(hidden.get("series.show"), Some(&json!(false)));

        let removed = Mutation::RemoveElement {
            path: "legend.0".into(),
        }
        .apply(&original, &config)
        .unwrap();
        assert!(removed.get("legend").is_none());

        let missing = Mutation::RemoveElement {
            path: "series.1".into(),
        }
        .apply(&original, &config);
        assert_eq!(missing, Err(MutationError::EntityNotFound("series.1".to_string())));
    }

    #[test]
    fn test_noop_classification() {
        assert!(MutationError::AlreadyMerged.is_noop());
        assert!(!MutationError::NoMatrix.is_noop());
        assert!(!MutationError::EntityNotFound("x".to_string()).is_noop());
    }
}
