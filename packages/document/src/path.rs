//! # Path Accessor
//!
//! Get/set-by-path over loose JSON values.
//!
//! Paths are dot-separated segments; sequence indices are plain integer
//! segments (`series.2.label`). Bracket notation (`series[2].label`) is
//! accepted and normalized to the dotted form. Dots inside keys cannot be
//! escaped.
//!
//! - `get` through a missing key or a non-container returns `None`
//! - `set` never mutates its input: it copies the whole value first
//! - `set` with `None` deletes the leaf (array slots are nulled, not spliced)
//! - `remove` deletes the leaf and splices arrays

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Parsed dotted path, serialized as its dotted string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// Parse a dotted (or bracketed) path; empty segments are dropped
    pub fn parse(path: &str) -> Self {
        let normalized = path.replace('[', ".").replace(']', "");
        let segments = normalized
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        Self { segments }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment (the slot key for document paths)
    pub fn head(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Append a segment
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for DocPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for DocPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for DocPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<&String> for DocPath {
    fn from(path: &String) -> Self {
        Self::parse(path)
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> Self {
        path.to_string()
    }
}

impl From<&DocPath> for DocPath {
    fn from(path: &DocPath) -> Self {
        path.clone()
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Array writes may replace an item or append one at the end, never leave a gap
fn appendable_index(items: &[Value], segment: &str) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index <= items.len())
}

/// Like `step_mut`, but creates empty objects for missing or null intermediates
fn step_or_create<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    let next = match value {
        Value::Object(map) => map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new())),
        Value::Array(items) => {
            let index = appendable_index(items, segment)?;
            if index == items.len() {
                items.push(Value::Null);
            }
            items.get_mut(index)?
        }
        _ => return None,
    };

    if next.is_null() {
        *next = Value::Object(Map::new());
    }
    Some(next)
}

/// Read the value at `path`
pub fn get<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.segments
        .iter()
        .try_fold(root, |current, segment| step(current, segment))
}

/// Read the value at `path`, falling back to `default`
pub fn get_or(root: &Value, path: &DocPath, default: Value) -> Value {
    get(root, path).cloned().unwrap_or(default)
}

/// Mutable access to the value at `path`
pub fn get_mut<'a>(root: &'a mut Value, path: &DocPath) -> Option<&'a mut Value> {
    if path.is_empty() {
        return None;
    }
    path.segments
        .iter()
        .try_fold(root, |current, segment| step_mut(current, segment))
}

/// Write (or delete, with `None`) the leaf at `path` in place.
///
/// Returns `false` and leaves `root` untouched when the root is not an
/// object, the path is empty, an intermediate is a scalar, or an array
/// index lies past the end of its array.
pub fn set_mut(root: &mut Value, path: &DocPath, value: Option<Value>) -> bool {
    if !root.is_object() {
        return false;
    }
    let Some((leaf, parents)) = path.segments.split_last() else {
        return false;
    };

    // Check first so a failed write never leaves half-created intermediates
    if !writable(root, parents, leaf, value.is_none()) {
        return false;
    }

    let mut current = root;
    for segment in parents {
        match step_or_create(current, segment) {
            Some(next) => current = next,
            None => return false,
        }
    }

    write_leaf(current, leaf, value)
}

fn writable(root: &Value, parents: &[String], leaf: &str, deleting: bool) -> bool {
    let mut current = root;
    for segment in parents {
        match current {
            Value::Object(_) => {}
            Value::Array(items) => {
                if appendable_index(items, segment).is_none() {
                    return false;
                }
            }
            _ => return false,
        }
        match step(current, segment) {
            Some(next) if !next.is_null() => current = next,
            // Missing or null intermediates are created on write
            _ => return true,
        }
    }
    match current {
        Value::Object(_) => true,
        Value::Array(_) if deleting => leaf.parse::<usize>().is_ok(),
        Value::Array(items) => appendable_index(items, leaf).is_some(),
        _ => false,
    }
}

fn write_leaf(target: &mut Value, leaf: &str, value: Option<Value>) -> bool {
    match target {
        Value::Object(map) => {
            match value {
                Some(value) => {
                    map.insert(leaf.to_string(), value);
                }
                None => {
                    map.remove(leaf);
                }
            }
            true
        }
        Value::Array(items) => {
            match value {
                Some(value) => {
                    let Some(index) = appendable_index(items, leaf) else {
                        return false;
                    };
                    if index == items.len() {
                        items.push(value);
                    } else {
                        items[index] = value;
                    }
                }
                None => {
                    let Ok(index) = leaf.parse::<usize>() else {
                        return false;
                    };
                    if let Some(slot) = items.get_mut(index) {
                        *slot = Value::Null;
                    }
                }
            }
            true
        }
        _ => false,
    }
}

/// Non-mutating write: returns a full copy of `root` with the leaf replaced
/// (or deleted). A non-object root is returned unchanged.
pub fn set(root: &Value, path: &DocPath, value: Option<Value>) -> Value {
    let mut copy = root.clone();
    if set_mut(&mut copy, path, value) {
        copy
    } else {
        root.clone()
    }
}

/// Remove the leaf at `path`, splicing it out if its parent is an array
pub fn remove(root: &mut Value, path: &DocPath) -> Option<Value> {
    let (leaf, parents) = path.segments.split_last()?;
    let parent = parents
        .iter()
        .try_fold(root, |current, segment| step_mut(current, segment))?;

    match parent {
        Value::Object(map) => map.remove(leaf),
        Value::Array(items) => {
            let index = leaf.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}
