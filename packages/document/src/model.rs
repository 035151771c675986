//! # Document Model
//!
//! The chart configuration being edited: a single JSON object organized into
//! named slots. A slot holds nothing, one entity, or a sequence of entities;
//! both forms are legal at rest and are normalized (single-as-sequence-of-one)
//! only when read.
//!
//! Entities point at each other by position (`gridIndex`, `xAxisIndex`,
//! `datasetIndex`). Those references are exposed as typed handles in
//! [`crate::refs`] whose `resolve` step returns an `Option`, so a dangling
//! index is a value to handle rather than a crash.

use crate::error::{value_type_name, DocumentError, DocumentResult};
use crate::kind::{AxisDim, CoordinateSystem, EntityKind, Slot, SlotStorage};
use crate::path::{self, DocPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Field map of one entity. Unknown keys are carried through untouched.
pub type Fields = Map<String, Value>;

/// The root configuration object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Document {
    /// Always a `Value::Object`; enforced by every constructor
    root: Value,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.root
    }
}

impl Document {
    /// Empty document
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    pub fn from_value(value: Value) -> DocumentResult<Self> {
        match value {
            Value::Object(_) => Ok(Self { root: value }),
            other => Err(DocumentError::NotAnObject(value_type_name(&other))),
        }
    }

    pub fn from_json(source: &str) -> DocumentResult<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    pub fn to_json_pretty(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    fn root_map_mut(&mut self) -> &mut Fields {
        if !self.root.is_object() {
            self.root = Value::Object(Map::new());
        }
        match &mut self.root {
            Value::Object(map) => map,
            _ => unreachable!("document root is always an object"),
        }
    }

    // ---------------------------------------------------------------
    // Path access
    // ---------------------------------------------------------------

    /// Read the value at a dotted path
    pub fn get(&self, path: impl Into<DocPath>) -> Option<&Value> {
        path::get(&self.root, &path.into())
    }

    pub fn get_mut(&mut self, path: impl Into<DocPath>) -> Option<&mut Value> {
        path::get_mut(&mut self.root, &path.into())
    }

    /// Non-mutating write: a full copy of this document with the leaf replaced
    /// (or deleted when `value` is `None`)
    pub fn with(&self, path: impl Into<DocPath>, value: Option<Value>) -> Document {
        Document {
            root: path::set(&self.root, &path.into(), value),
        }
    }

    /// In-place write; `false` when the path cannot be written
    pub fn set(&mut self, path: impl Into<DocPath>, value: Option<Value>) -> bool {
        path::set_mut(&mut self.root, &path.into(), value)
    }

    /// Remove the value at a path, splicing sequences
    pub fn remove(&mut self, path: impl Into<DocPath>) -> Option<Value> {
        path::remove(&mut self.root, &path.into())
    }

    // ---------------------------------------------------------------
    // Slot access (normalized reads)
    // ---------------------------------------------------------------

    /// Raw stored value of a slot
    pub fn slot_value(&self, slot: Slot) -> Option<&Value> {
        self.root.get(slot.key())
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.slot_value(slot).is_some_and(|value| !value.is_null())
    }

    /// Whether the slot is stored in sequence form
    pub fn is_sequence(&self, slot: Slot) -> bool {
        matches!(self.slot_value(slot), Some(Value::Array(_)))
    }

    /// Every entity of a slot, single-as-sequence-of-one
    pub fn entities(&self, slot: Slot) -> Vec<EntityRef<'_>> {
        match self.slot_value(slot) {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    item.as_object().map(|fields| EntityRef {
                        path: EntityPath::indexed(slot, index),
                        fields,
                    })
                })
                .collect(),
            Some(Value::Object(fields)) => vec![EntityRef {
                path: EntityPath::single(slot),
                fields,
            }],
            _ => Vec::new(),
        }
    }

    /// Number of positions in a slot (a single entity counts as one)
    pub fn count(&self, slot: Slot) -> usize {
        match self.slot_value(slot) {
            Some(Value::Array(items)) => items.len(),
            Some(Value::Object(_)) => 1,
            _ => 0,
        }
    }

    /// Entity at a position, reading a single stored entity as position 0
    pub fn nth(&self, slot: Slot, index: usize) -> Option<&Fields> {
        match self.slot_value(slot)? {
            Value::Array(items) => items.get(index)?.as_object(),
            Value::Object(fields) if index == 0 => Some(fields),
            _ => None,
        }
    }

    pub fn nth_mut(&mut self, slot: Slot, index: usize) -> Option<&mut Fields> {
        match self.root.get_mut(slot.key())? {
            Value::Array(items) => items.get_mut(index)?.as_object_mut(),
            Value::Object(fields) if index == 0 => Some(fields),
            _ => None,
        }
    }

    /// Entity addressed by a path
    pub fn entity(&self, path: &EntityPath) -> Option<&Fields> {
        self.nth(path.slot, path.position())
    }

    pub fn entity_mut(&mut self, path: &EntityPath) -> Option<&mut Fields> {
        self.nth_mut(path.slot, path.position())
    }

    pub fn matrix(&self) -> Option<&Fields> {
        self.slot_value(Slot::Matrix)?.as_object()
    }

    pub fn matrix_mut(&mut self) -> Option<&mut Fields> {
        self.root.get_mut(Slot::Matrix.key())?.as_object_mut()
    }

    /// Append an entity following the slot's storage preference and return
    /// its path. This is the only place storage shape changes on add.
    pub fn push_entity(&mut self, slot: Slot, entity: Fields) -> EntityPath {
        let entity = Value::Object(entity);
        let root = self.root_map_mut();
        let current = root.remove(slot.key()).filter(|value| !value.is_null());

        let (stored, path) = match (slot.storage(), current) {
            (SlotStorage::Single, _) | (SlotStorage::SingletonFirst, None) => {
                (entity, EntityPath::single(slot))
            }
            (_, Some(Value::Array(mut items))) => {
                items.push(entity);
                let index = items.len() - 1;
                (Value::Array(items), EntityPath::indexed(slot, index))
            }
            (_, Some(existing)) => (
                Value::Array(vec![existing, entity]),
                EntityPath::indexed(slot, 1),
            ),
            (SlotStorage::Sequence, None) => (
                Value::Array(vec![entity]),
                EntityPath::indexed(slot, 0),
            ),
        };

        root.insert(slot.key().to_string(), stored);
        path
    }

    /// Delete the entity at a path: splice a sequence position, or drop the
    /// whole slot key for an unindexed path
    pub fn remove_entity(&mut self, path: &EntityPath) -> Option<Value> {
        let key = path.slot.key();
        match path.index {
            Some(index) if self.is_sequence(path.slot) => match self.root.get_mut(key) {
                Some(Value::Array(items)) if index < items.len() => Some(items.remove(index)),
                _ => None,
            },
            Some(index) if index > 0 => None,
            _ => self.root_map_mut().remove(key),
        }
    }
}

/// Positional address of an entity: `slot` or `slot.N`.
///
/// Paths are not stable identifiers; removing `series.1` renumbers
/// `series.2` to `series.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityPath {
    pub slot: Slot,
    pub index: Option<usize>,
}

impl EntityPath {
    pub fn single(slot: Slot) -> Self {
        Self { slot, index: None }
    }

    pub fn indexed(slot: Slot, index: usize) -> Self {
        Self {
            slot,
            index: Some(index),
        }
    }

    /// Sequence position; an unindexed path addresses position 0
    pub fn position(&self) -> usize {
        self.index.unwrap_or(0)
    }

    pub fn to_doc_path(&self) -> DocPath {
        DocPath::parse(&self.to_string())
    }

    /// Path of a field under this entity
    pub fn field(&self, key: &str) -> DocPath {
        self.to_doc_path().child(key)
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}.{}", self.slot, index),
            None => write!(f, "{}", self.slot),
        }
    }
}

impl FromStr for EntityPath {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocumentError::InvalidEntityPath(s.to_string());
        let parsed = DocPath::parse(s);

        match parsed.segments() {
            [slot] => Ok(Self::single(Slot::from_key(slot).ok_or_else(invalid)?)),
            [slot, index] => Ok(Self::indexed(
                Slot::from_key(slot).ok_or_else(invalid)?,
                index.parse().map_err(|_| invalid())?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for EntityPath {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityPath> for String {
    fn from(path: EntityPath) -> Self {
        path.to_string()
    }
}

/// Borrowed entity together with its path
#[derive(Debug, Clone, Copy)]
pub struct EntityRef<'a> {
    pub path: EntityPath,
    pub fields: &'a Fields,
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> EntityKind {
        EntityKind::classify(self.path.slot, self.fields.type_name())
    }
}

/// Cell position inside the matrix coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixCoord {
    pub col: usize,
    pub row: usize,
}

impl MatrixCoord {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Read a `[col, row]` pair
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_array()?.as_slice() {
            [col, row] => Some(Self {
                col: usize::try_from(col.as_u64()?).ok()?,
                row: usize::try_from(row.as_u64()?).ok()?,
            }),
            _ => None,
        }
    }

    pub fn to_value(self) -> Value {
        Value::Array(vec![Value::from(self.col), Value::from(self.row)])
    }
}

impl fmt::Display for MatrixCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.col, self.row)
    }
}

/// Typed readers over an entity's loose field map
pub trait EntityFields {
    fn type_name(&self) -> Option<&str>;
    fn coordinate_system(&self) -> Option<CoordinateSystem>;
    fn matrix_coord(&self) -> Option<MatrixCoord>;
    /// Non-negative integer field, `0` when absent or malformed
    fn index_or_zero(&self, key: &str) -> usize;
    /// Non-negative integer field, `None` when absent or malformed
    fn index_field(&self, key: &str) -> Option<usize>;
    /// `show` flag, true unless explicitly `false`
    fn is_visible(&self) -> bool;
    /// Display label: `name`, `text`, then `id`
    fn label(&self) -> Option<String>;
    fn in_matrix(&self) -> bool {
        self.coordinate_system() == Some(CoordinateSystem::Matrix)
    }
    fn axis_index(&self, dim: AxisDim) -> usize {
        self.index_or_zero(dim.index_key())
    }
}

impl EntityFields for Fields {
    fn type_name(&self) -> Option<&str> {
        self.get("type").and_then(Value::as_str)
    }

    fn coordinate_system(&self) -> Option<CoordinateSystem> {
        self.get("coordinateSystem")
            .and_then(Value::as_str)
            .map(CoordinateSystem::parse)
    }

    fn matrix_coord(&self) -> Option<MatrixCoord> {
        self.get("coord").and_then(MatrixCoord::from_value)
    }

    fn index_or_zero(&self, key: &str) -> usize {
        self.index_field(key).unwrap_or(0)
    }

    fn index_field(&self, key: &str) -> Option<usize> {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|index| usize::try_from(index).ok())
    }

    fn is_visible(&self) -> bool {
        self.get("show") != Some(&Value::Bool(false))
    }

    fn label(&self) -> Option<String> {
        ["name", "text", "id"].iter().find_map(|key| match self.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}
