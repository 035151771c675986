//! # Chartdoc Editor
//!
//! Structural editing engine for chart configuration documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: flat slots, positional references │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: intent-level mutations              │
//! │  - Placement in matrix / grid / root        │
//! │  - Matrix merge, insert, delete             │
//! │  - Snapshot undo/redo                       │
//! │  - Derived display hierarchy                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render sink: consumes whole documents       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is source of truth**: the hierarchy is a derived view
//! 2. **Single writer**: every change goes through [`EditSession::dispatch`]
//! 3. **Atomic commands**: a rejected command leaves the document untouched
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chartdoc_editor::{EditSession, EditorConfig, Mutation, Target};
//!
//! let mut session = EditSession::new(chartdoc_document::starter_document(), EditorConfig::default());
//!
//! session.dispatch(Mutation::AddElement {
//!     kind: "series.bar".parse()?,
//!     parent: Some(Target::Matrix),
//!     initial: None,
//! });
//!
//! for node in session.hierarchy() {
//!     println!("{}", node.label);
//! }
//!
//! session.undo();
//! ```

mod config;
mod errors;
mod history;
mod mutations;
mod pipeline;
mod session;

pub mod data_binding;
pub mod diagnostics;
pub mod hierarchy;
pub mod matrix;
pub mod placement;

pub use config::{EditorConfig, DEFAULT_RECORDABLE_ACTIONS};
pub use data_binding::{Binding, DataSource};
pub use diagnostics::{CheckRegistry, CheckRule, Diagnostic, DiagnosticLevel};
pub use errors::EditorError;
pub use hierarchy::{derive_hierarchy, DisplayNode, Placement};
pub use history::{History, HistoryEntry};
pub use matrix::{CellSelection, MatrixAxis, MergeRegion};
pub use mutations::{Mutation, MutationError, PropertyUpdate, Target};
pub use pipeline::{NullSink, Pipeline, RenderSink};
pub use session::{CommandOutcome, EditSession, RenderEvent};

// Re-export document types for convenience
pub use chartdoc_document::{DocPath, Document, ElementKind, EntityPath, Fields};
