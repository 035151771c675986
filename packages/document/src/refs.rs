//! Positional cross-references between entities.
//!
//! Each handle wraps an array position and only yields an entity through
//! `resolve`, which returns `None` for an index past the end of its slot.

use crate::kind::{AxisDim, Slot};
use crate::model::{Document, EntityFields, Fields};

/// Reference to a grid by position (`gridIndex`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRef(pub usize);

impl GridRef {
    /// The grid an axis is bound to; `gridIndex` defaults to 0
    pub fn of_axis(axis: &Fields) -> Self {
        GridRef(axis.index_or_zero("gridIndex"))
    }

    pub fn resolve(self, doc: &Document) -> Option<&Fields> {
        doc.nth(Slot::Grid, self.0)
    }
}

/// Reference to an x or y axis by position (`xAxisIndex` / `yAxisIndex`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisRef {
    pub dim: AxisDim,
    pub index: usize,
}

impl AxisRef {
    pub fn new(dim: AxisDim, index: usize) -> Self {
        Self { dim, index }
    }

    /// The axis a series points at; the index defaults to 0
    pub fn of_series(series: &Fields, dim: AxisDim) -> Self {
        Self::new(dim, series.axis_index(dim))
    }

    pub fn resolve(self, doc: &Document) -> Option<&Fields> {
        doc.nth(self.dim.slot(), self.index)
    }

    /// Follow the axis to its grid, if the axis exists
    pub fn grid(self, doc: &Document) -> Option<GridRef> {
        self.resolve(doc).map(GridRef::of_axis)
    }
}

/// Reference to a dataset by position (`datasetIndex`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetRef(pub usize);

impl DatasetRef {
    /// The dataset a series is bound to, if it carries `datasetIndex`
    pub fn of_series(series: &Fields) -> Option<Self> {
        series.index_field("datasetIndex").map(DatasetRef)
    }

    pub fn resolve(self, doc: &Document) -> Option<&Fields> {
        doc.nth(Slot::Dataset, self.0)
    }
}

/// First axis of `dim` bound to `grid`, scanning in position order
pub fn first_axis_on_grid(doc: &Document, dim: AxisDim, grid: GridRef) -> Option<AxisRef> {
    doc.entities(dim.slot())
        .into_iter()
        .find(|axis| GridRef::of_axis(axis.fields) == grid)
        .map(|axis| AxisRef::new(dim, axis.path.position()))
}
