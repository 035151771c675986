//! # Undo/Redo History
//!
//! Snapshot history of whole documents.
//!
//! ## Design
//!
//! - The session records the document as it was *before* each recorded edit
//! - Undo hands back the newest past snapshot and parks the current document
//!   on the redo side
//! - Recording a new edit clears the redo side
//! - The past side is capped; the oldest snapshot is evicted first
//! - A transaction collapses several edits into one undo step
//!
//! Snapshots are full documents, so an undo can never drift from what the
//! user actually saw.

use crate::mutations::MutationError;
use chartdoc_document::Document;
use std::collections::VecDeque;

/// A document snapshot and the action that replaced it
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub document: Document,
    pub label: String,
}

#[derive(Debug, Clone)]
struct Transaction {
    before: Document,
    label: Option<String>,
    /// Nesting depth; only the outermost commit closes the step
    depth: usize,
    recorded: bool,
}

/// Bounded undo/redo history
#[derive(Debug, Clone)]
pub struct History {
    /// Oldest first
    past: VecDeque<HistoryEntry>,

    /// Most recently undone last
    future: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    capacity: usize,

    transaction: Option<Transaction>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            capacity,
            transaction: None,
        }
    }

    /// Record the document as it was before an edit labelled `label`
    pub fn record(&mut self, before: Document, label: impl Into<String>) {
        let label = label.into();

        if let Some(transaction) = &mut self.transaction {
            transaction.recorded = true;
            transaction.label.get_or_insert(label);
            return;
        }

        self.push(HistoryEntry {
            document: before,
            label,
        });
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.past.push_back(entry);

        while self.capacity > 0 && self.past.len() > self.capacity {
            self.past.pop_front();
        }

        self.future.clear();
    }

    /// Step back; `current` moves to the redo side
    pub fn undo(&mut self, current: &Document) -> Result<Document, MutationError> {
        let entry = self.past.pop_back().ok_or(MutationError::NothingToUndo)?;
        self.future.push(HistoryEntry {
            document: current.clone(),
            label: entry.label.clone(),
        });
        tracing::debug!(label = %entry.label, "undo");
        Ok(entry.document)
    }

    /// Step forward; `current` moves back to the undo side
    pub fn redo(&mut self, current: &Document) -> Result<Document, MutationError> {
        let entry = self.future.pop().ok_or(MutationError::NothingToRedo)?;
        self.past.push_back(HistoryEntry {
            document: current.clone(),
            label: entry.label.clone(),
        });
        tracing::debug!(label = %entry.label, "redo");
        Ok(entry.document)
    }

    /// Open a transaction starting from `current`; nested calls join the
    /// outer transaction
    pub fn begin_transaction(&mut self, current: &Document, label: Option<String>) {
        match &mut self.transaction {
            Some(transaction) => transaction.depth += 1,
            None => {
                self.transaction = Some(Transaction {
                    before: current.clone(),
                    label,
                    depth: 1,
                    recorded: false,
                })
            }
        }
    }

    /// Close the innermost transaction. Returns true when the outermost one
    /// closed with at least one recorded edit.
    pub fn commit_transaction(&mut self) -> Result<bool, MutationError> {
        let transaction = self
            .transaction
            .as_mut()
            .ok_or(MutationError::NoTransaction)?;

        if transaction.depth > 1 {
            transaction.depth -= 1;
            return Ok(false);
        }

        match self.transaction.take() {
            Some(Transaction {
                before,
                label,
                recorded: true,
                ..
            }) => {
                self.push(HistoryEntry {
                    document: before,
                    label: label.unwrap_or_else(|| "transaction".to_string()),
                });
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Abandon the whole transaction and return the document it started from
    pub fn rollback_transaction(&mut self) -> Result<Document, MutationError> {
        self.transaction
            .take()
            .map(|transaction| transaction.before)
            .ok_or(MutationError::NoTransaction)
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.past.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    /// Label of the step the next undo reverts
    pub fn undo_label(&self) -> Option<&str> {
        self.past.back().map(|entry| entry.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.future.last().map(|entry| entry.label.as_str())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the cap, evicting the oldest snapshots if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while capacity > 0 && self.past.len() > capacity {
            self.past.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.transaction = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn version(n: u64) -> Document {
        Document::from_value(json!({ "title": { "text": n.to_string() } })).unwrap()
    }

    #[test]
    fn test_history_creation() {
        let history = History::default();
        assert_eq!(history.capacity(), 50);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_swaps_snapshots() {
        let mut history = History::new(10);
        history.record(version(0), "updateProperty");

        let undone = history.undo(&version(1)).unwrap();
        assert_eq!(undone, version(0));
        assert_eq!(history.redo_label(), Some("updateProperty"));

        let redone = history.redo(&undone).unwrap();
        assert_eq!(redone, version(1));
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_empty_sides_report_noop_errors() {
        let mut history = History::new(10);
        assert_eq!(history.undo(&version(0)), Err(MutationError::NothingToUndo));
        assert_eq!(history.redo(&version(0)), Err(MutationError::NothingToRedo));
        assert_eq!(history.commit_transaction(), Err(MutationError::NoTransaction));
    }

    #[test]
    fn test_nested_transaction_records_once() {
        let mut history = History::new(10);
        history.begin_transaction(&version(0), Some("bulk edit".to_string()));
        history.begin_transaction(&version(1), None);
        history.record(version(1), "updateProperty");
        history.record(version(2), "mergeCells");

        assert_eq!(history.commit_transaction(), Ok(false));
        assert_eq!(history.commit_transaction(), Ok(true));
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.undo_label(), Some("bulk edit"));
        assert_eq!(history.undo(&version(3)), Ok(version(0)));
    }

    #[test]
    fn test_shrinking_capacity_evicts_oldest() {
        let mut history = History::new(0);
        for n in 0..5 {
            history.record(version(n), format!("edit {}", n));
        }
        history.set_capacity(2);

        assert_eq!(history.undo_levels(), 2);
        assert_eq!(history.undo(&version(5)), Ok(version(4)));
        assert_eq!(history.undo(&version(4)), Ok(version(3)));
        assert!(!history.can_undo());
    }
}
