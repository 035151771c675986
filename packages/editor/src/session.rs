//! # Edit Session
//!
//! The single writer of a document. Every change goes through
//! [`EditSession::dispatch`], which applies the mutation to a working copy,
//! records history, bumps the version, and keeps the selection valid.
//!
//! Rendering is a downstream consumer: it reads the document and reports
//! clicks back as [`RenderEvent`]s, but never writes.

use crate::config::EditorConfig;
use crate::hierarchy::{derive_hierarchy, DisplayNode};
use crate::history::History;
use crate::mutations::{Mutation, MutationError};
use chartdoc_document::{Document, EntityPath, Fields};
use serde::{Deserialize, Serialize};

/// What happened to a dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The document changed and now has this version
    Applied { version: u64 },
    /// The command was valid but had nothing to do
    Unchanged,
    Rejected(MutationError),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied { .. })
    }
}

/// Interaction reported back from a render surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RenderEvent {
    /// A rendered component was clicked
    Clicked { path: EntityPath },
    /// Click on empty space
    Cleared,
}

/// Single-writer editing session
#[derive(Debug, Clone)]
pub struct EditSession {
    document: Document,
    config: EditorConfig,
    history: History,
    /// Incremented on every document change, including undo and redo
    version: u64,
    selection: Option<EntityPath>,
}

impl EditSession {
    pub fn new(document: Document, config: EditorConfig) -> Self {
        Self {
            document,
            history: History::new(config.history_limit),
            config,
            version: 0,
            selection: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Option<&EntityPath> {
        self.selection.as_ref()
    }

    /// Fields of the selected entity
    pub fn selected_fields(&self) -> Option<&Fields> {
        self.selection.and_then(|path| self.document.entity(&path))
    }

    /// Display tree of the current document
    pub fn hierarchy(&self) -> Vec<DisplayNode> {
        derive_hierarchy(&self.document)
    }

    /// Apply a mutation.
    ///
    /// History gets a snapshot only when the action is recordable and the
    /// document actually changed.
    pub fn dispatch(&mut self, mutation: Mutation) -> CommandOutcome {
        let action = mutation.name();

        match mutation.apply(&self.document, &self.config) {
            Ok(next) if next == self.document => {
                tracing::debug!(action, "command left document unchanged");
                CommandOutcome::Unchanged
            }
            Ok(next) => {
                let before = std::mem::replace(&mut self.document, next);
                if self.config.is_recordable(action) {
                    self.history.record(before, action);
                }
                self.changed();
                tracing::debug!(action, version = self.version, "applied command");
                CommandOutcome::Applied {
                    version: self.version,
                }
            }
            Err(error) if error.is_noop() => {
                tracing::debug!(action, %error, "command was a no-op");
                CommandOutcome::Unchanged
            }
            Err(error) => {
                tracing::warn!(action, %error, "rejected command");
                CommandOutcome::Rejected(error)
            }
        }
    }

    /// Apply several mutations as one undo step; stops at the first rejection
    /// and rolls the whole batch back
    pub fn dispatch_all(
        &mut self,
        label: impl Into<String>,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> CommandOutcome {
        let start = self.version;
        self.begin_transaction(label);

        for mutation in mutations {
            if let CommandOutcome::Rejected(error) = self.dispatch(mutation) {
                self.rollback_transaction();
                return CommandOutcome::Rejected(error);
            }
        }

        self.commit_transaction();
        if self.version == start {
            CommandOutcome::Unchanged
        } else {
            CommandOutcome::Applied {
                version: self.version,
            }
        }
    }

    pub fn undo(&mut self) -> CommandOutcome {
        let restored = self.history.undo(&self.document);
        self.restore(restored)
    }

    pub fn redo(&mut self) -> CommandOutcome {
        let restored = self.history.redo(&self.document);
        self.restore(restored)
    }

    fn restore(&mut self, restored: Result<Document, MutationError>) -> CommandOutcome {
        match restored {
            Ok(document) => {
                self.document = document;
                self.changed();
                CommandOutcome::Applied {
                    version: self.version,
                }
            }
            Err(error) if error.is_noop() => CommandOutcome::Unchanged,
            Err(error) => CommandOutcome::Rejected(error),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Group the following recordable commands into one undo step
    pub fn begin_transaction(&mut self, label: impl Into<String>) {
        self.history
            .begin_transaction(&self.document, Some(label.into()));
    }

    /// Returns true when a history step was recorded
    pub fn commit_transaction(&mut self) -> bool {
        self.history.commit_transaction().unwrap_or(false)
    }

    /// Drop every change made since the transaction began
    pub fn rollback_transaction(&mut self) -> bool {
        match self.history.rollback_transaction() {
            Ok(before) if before != self.document => {
                self.document = before;
                self.changed();
                true
            }
            Ok(_) => true,
            Err(_) => false,
        }
    }

    /// Select an entity; fails when the path does not resolve
    pub fn select(&mut self, path: EntityPath) -> bool {
        if self.document.entity(&path).is_some() {
            self.selection = Some(path);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn handle_event(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Clicked { path } => {
                if !self.select(path) {
                    tracing::debug!(%path, "click on unknown entity ignored");
                }
            }
            RenderEvent::Cleared => self.clear_selection(),
        }
    }

    fn changed(&mut self) {
        self.version += 1;

        if let Some(path) = self.selection {
            if self.document.entity(&path).is_none() {
                tracing::debug!(%path, "selection no longer resolves");
                self.selection = None;
            }
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(Document::new(), EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(value: serde_json::Value) -> EditSession {
        EditSession::new(Document::from_value(value).unwrap(), EditorConfig::default())
    }

    #[test]
    fn test_session_creation() {
        let session = EditSession::default();
        assert_eq!(session.version(), 0);
        assert!(session.selection().is_none());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_selection_follows_document() {
        let mut session = session(json!({ "series": [{ "type": "line" }, { "type": "bar" }] }));
        let path: EntityPath = "series.1".parse().unwrap();

        session.handle_event(RenderEvent::Clicked { path });
        assert_eq!(session.selection(), Some(&path));

        session.dispatch(Mutation::RemoveElement {
            path: "series.1".into(),
        });
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_click_on_unknown_entity_is_ignored() {
        let mut session = session(json!({}));
        session.handle_event(RenderEvent::Clicked {
            path: "legend".parse().unwrap(),
        });
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_non_recordable_action_skips_history() {
        let mut session = session(json!({}));
        let outcome = session.dispatch(Mutation::ReplaceDocument {
            document: Document::from_value(json!({ "title": {} })).unwrap(),
        });

        assert_eq!(outcome, CommandOutcome::Applied { version: 1 });
        assert!(!session.can_undo());
    }

    #[test]
    fn test_noop_rejection_is_unchanged() {
        let mut session = session(json!({ "matrix": {} }));
        let outcome = session.dispatch(Mutation::MergeCells {
            selection: crate::matrix::CellSelection::cell(1, 1),
        });

        assert_eq!(outcome, CommandOutcome::Unchanged);
        assert_eq!(session.version(), 0);
    }
}
