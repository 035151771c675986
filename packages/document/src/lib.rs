//! # Chartdoc Document
//!
//! In-memory model of a chart configuration document.
//!
//! The document is one JSON object split into named slots (`series`,
//! `xAxis`, `grid`, `matrix`, ...). Entities reference each other by array
//! position; this crate gives those loose records typed views without
//! modeling the full chart schema, so unknown fields always round-trip.
//!
//! ```text
//! path      dotted get/set over the raw JSON tree
//! model     Document, EntityPath, EntityFields, MatrixCoord
//! kind      Slot, SeriesType, EntityKind, CoordinateSystem
//! refs      GridRef / AxisRef / DatasetRef with Option-returning resolve
//! visitor   walk every entity of every slot
//! defaults  per-kind payloads for newly added elements
//! starter   the session-start dashboard document
//! ```

mod error;
mod kind;
mod model;

pub mod defaults;
pub mod path;
pub mod refs;
pub mod starter;
pub mod visitor;

pub use error::{DocumentError, DocumentResult};
pub use kind::{AxisDim, CoordinateSystem, ElementKind, EntityKind, SeriesType, Slot, SlotStorage};
pub use model::{Document, EntityFields, EntityPath, EntityRef, Fields, MatrixCoord};
pub use path::DocPath;
pub use refs::{AxisRef, DatasetRef, GridRef};
pub use starter::{starter_document, starter_document_with, StarterConfig};
