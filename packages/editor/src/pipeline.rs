//! # Editing Pipeline
//!
//! Coordinates the document lifecycle: Dispatch → Record → Derive → Render
//!
//! The Pipeline manages:
//! - Routing commands through the session
//! - Re-deriving the display tree once per version
//! - Pushing new documents to a render surface

use crate::diagnostics::{CheckRegistry, Diagnostic};
use crate::hierarchy::DisplayNode;
use crate::mutations::Mutation;
use crate::session::{CommandOutcome, EditSession, RenderEvent};
use chartdoc_document::Document;

/// Consumer of rendered documents, e.g. a chart canvas or a file writer
pub trait RenderSink {
    /// Called once per document version
    fn render(&mut self, document: &Document, version: u64);
}

/// Sink that keeps nothing; for headless sessions
#[derive(Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _document: &Document, _version: u64) {}
}

/// Manages the full edit → render pipeline
pub struct Pipeline<S: RenderSink> {
    session: EditSession,
    sink: S,
    checks: CheckRegistry,
    /// Version last handed to the sink
    rendered: Option<u64>,
    /// Display tree and the version it was derived from
    hierarchy: Option<(u64, Vec<DisplayNode>)>,
}

impl<S: RenderSink> Pipeline<S> {
    pub fn new(session: EditSession, sink: S) -> Self {
        Self {
            checks: CheckRegistry::with_config(session.config()),
            session,
            sink,
            rendered: None,
            hierarchy: None,
        }
    }

    /// Dispatch a command and render if it changed the document
    pub fn apply(&mut self, mutation: Mutation) -> CommandOutcome {
        let outcome = self.session.dispatch(mutation);
        self.flush();
        outcome
    }

    pub fn undo(&mut self) -> CommandOutcome {
        let outcome = self.session.undo();
        self.flush();
        outcome
    }

    pub fn redo(&mut self) -> CommandOutcome {
        let outcome = self.session.redo();
        self.flush();
        outcome
    }

    /// Route an interaction from the render surface back to the session
    pub fn handle_event(&mut self, event: RenderEvent) {
        self.session.handle_event(event);
    }

    /// Render the current version unless the sink already has it
    pub fn flush(&mut self) {
        let version = self.session.version();
        if self.rendered == Some(version) {
            return;
        }

        self.sink.render(self.session.document(), version);
        self.rendered = Some(version);
        tracing::trace!(version, "rendered document");
    }

    /// Display tree for the current version, derived at most once per version
    pub fn hierarchy(&mut self) -> &[DisplayNode] {
        let version = self.session.version();
        let stale = !matches!(&self.hierarchy, Some((cached, _)) if *cached == version);
        if stale {
            self.hierarchy = Some((version, self.session.hierarchy()));
        }

        match &self.hierarchy {
            Some((_, nodes)) => nodes.as_slice(),
            None => &[],
        }
    }

    /// Run consistency checks against the current document
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.checks.check(self.session.document())
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditSession {
        &mut self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_session(self) -> EditSession {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSink {
        versions: Vec<u64>,
    }

    impl RenderSink for RecordingSink {
        fn render(&mut self, _document: &Document, version: u64) {
            self.versions.push(version);
        }
    }

    #[test]
    fn test_pipeline_renders_once_per_version() {
        let mut pipeline = Pipeline::new(EditSession::default(), RecordingSink::default());
        pipeline.flush();

        pipeline.apply(Mutation::UpdateProperty {
            path: "title.text".into(),
            value: Some(json!("Sales")),
        });
        pipeline.apply(Mutation::RemoveElement {
            path: "legend".into(),
        });
        pipeline.flush();

        assert_eq!(pipeline.sink().versions, vec![0, 1]);
    }

    #[test]
    fn test_hierarchy_is_cached_per_version() {
        let mut pipeline = Pipeline::new(EditSession::default(), NullSink);
        assert!(pipeline.hierarchy().is_empty());

        pipeline.apply(Mutation::UpdateProperty {
            path: "legend.show".into(),
            value: Some(json!(true)),
        });
        assert_eq!(pipeline.hierarchy().len(), 1);
    }
}
