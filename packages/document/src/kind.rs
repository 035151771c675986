//! Slot and entity classification

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named top-level field of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Series,
    XAxis,
    YAxis,
    Grid,
    Title,
    Legend,
    Tooltip,
    DataZoom,
    VisualMap,
    Toolbox,
    Brush,
    Timeline,
    Graphic,
    Dataset,
    Matrix,
}

/// How a slot prefers to store newly added entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStorage {
    /// Always a sequence once anything is added
    Sequence,
    /// A single entity until a second one arrives
    SingletonFirst,
    /// Exactly one entity; adding replaces it
    Single,
}

impl Slot {
    pub const ALL: [Slot; 15] = [
        Slot::Series,
        Slot::XAxis,
        Slot::YAxis,
        Slot::Grid,
        Slot::Title,
        Slot::Legend,
        Slot::Tooltip,
        Slot::DataZoom,
        Slot::VisualMap,
        Slot::Toolbox,
        Slot::Brush,
        Slot::Timeline,
        Slot::Graphic,
        Slot::Dataset,
        Slot::Matrix,
    ];

    /// Order in which entity slots are placed into the display hierarchy.
    /// Grids and the matrix are containers and are handled separately.
    pub const PROCESSING_ORDER: [Slot; 13] = [
        Slot::Series,
        Slot::XAxis,
        Slot::YAxis,
        Slot::Title,
        Slot::Legend,
        Slot::Toolbox,
        Slot::Tooltip,
        Slot::DataZoom,
        Slot::VisualMap,
        Slot::Timeline,
        Slot::Brush,
        Slot::Graphic,
        Slot::Dataset,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::Series => "series",
            Slot::XAxis => "xAxis",
            Slot::YAxis => "yAxis",
            Slot::Grid => "grid",
            Slot::Title => "title",
            Slot::Legend => "legend",
            Slot::Tooltip => "tooltip",
            Slot::DataZoom => "dataZoom",
            Slot::VisualMap => "visualMap",
            Slot::Toolbox => "toolbox",
            Slot::Brush => "brush",
            Slot::Timeline => "timeline",
            Slot::Graphic => "graphic",
            Slot::Dataset => "dataset",
            Slot::Matrix => "matrix",
        }
    }

    pub fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }

    pub fn storage(self) -> SlotStorage {
        match self {
            Slot::Series
            | Slot::XAxis
            | Slot::YAxis
            | Slot::Grid
            | Slot::DataZoom
            | Slot::VisualMap
            | Slot::Graphic
            | Slot::Dataset => SlotStorage::Sequence,
            Slot::Title
            | Slot::Legend
            | Slot::Toolbox
            | Slot::Tooltip
            | Slot::Brush
            | Slot::Timeline => SlotStorage::SingletonFirst,
            Slot::Matrix => SlotStorage::Single,
        }
    }

    pub fn is_axis(self) -> bool {
        matches!(self, Slot::XAxis | Slot::YAxis)
    }

    /// Slots whose entities may sit directly in the matrix coordinate space
    pub fn is_matrix_placeable(self) -> bool {
        matches!(
            self,
            Slot::Series | Slot::Grid | Slot::Title | Slot::Legend | Slot::Graphic | Slot::Timeline
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Cartesian axis dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisDim {
    X,
    Y,
}

impl AxisDim {
    pub fn slot(self) -> Slot {
        match self {
            AxisDim::X => Slot::XAxis,
            AxisDim::Y => Slot::YAxis,
        }
    }

    /// Series field holding the positional reference to an axis of this dimension
    pub fn index_key(self) -> &'static str {
        match self {
            AxisDim::X => "xAxisIndex",
            AxisDim::Y => "yAxisIndex",
        }
    }

    pub fn from_slot(slot: Slot) -> Option<AxisDim> {
        match slot {
            Slot::XAxis => Some(AxisDim::X),
            Slot::YAxis => Some(AxisDim::Y),
            _ => None,
        }
    }
}

/// Series chart type (the `type` field of a series)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesType {
    Line,
    Bar,
    Scatter,
    EffectScatter,
    Candlestick,
    Boxplot,
    Heatmap,
    Pie,
    Funnel,
    Gauge,
    Graph,
    Tree,
    Treemap,
    Sunburst,
    Sankey,
    Radar,
    Lines,
    PictorialBar,
    ThemeRiver,
    Custom,
    Other(String),
}

impl SeriesType {
    pub fn parse(name: &str) -> Self {
        match name {
            "line" => SeriesType::Line,
            "bar" => SeriesType::Bar,
            "scatter" => SeriesType::Scatter,
            "effectScatter" => SeriesType::EffectScatter,
            "candlestick" => SeriesType::Candlestick,
            "boxplot" => SeriesType::Boxplot,
            "heatmap" => SeriesType::Heatmap,
            "pie" => SeriesType::Pie,
            "funnel" => SeriesType::Funnel,
            "gauge" => SeriesType::Gauge,
            "graph" => SeriesType::Graph,
            "tree" => SeriesType::Tree,
            "treemap" => SeriesType::Treemap,
            "sunburst" => SeriesType::Sunburst,
            "sankey" => SeriesType::Sankey,
            "radar" => SeriesType::Radar,
            "lines" => SeriesType::Lines,
            "pictorialBar" => SeriesType::PictorialBar,
            "themeRiver" => SeriesType::ThemeRiver,
            "custom" => SeriesType::Custom,
            other => SeriesType::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SeriesType::Line => "line",
            SeriesType::Bar => "bar",
            SeriesType::Scatter => "scatter",
            SeriesType::EffectScatter => "effectScatter",
            SeriesType::Candlestick => "candlestick",
            SeriesType::Boxplot => "boxplot",
            SeriesType::Heatmap => "heatmap",
            SeriesType::Pie => "pie",
            SeriesType::Funnel => "funnel",
            SeriesType::Gauge => "gauge",
            SeriesType::Graph => "graph",
            SeriesType::Tree => "tree",
            SeriesType::Treemap => "treemap",
            SeriesType::Sunburst => "sunburst",
            SeriesType::Sankey => "sankey",
            SeriesType::Radar => "radar",
            SeriesType::Lines => "lines",
            SeriesType::PictorialBar => "pictorialBar",
            SeriesType::ThemeRiver => "themeRiver",
            SeriesType::Custom => "custom",
            SeriesType::Other(name) => name,
        }
    }

    /// Types plotted on a grid through an x/y axis pair
    pub fn is_cartesian(&self) -> bool {
        matches!(
            self,
            SeriesType::Line
                | SeriesType::Bar
                | SeriesType::Scatter
                | SeriesType::EffectScatter
                | SeriesType::Candlestick
                | SeriesType::Boxplot
                | SeriesType::Heatmap
        )
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of a stored entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Series with its chart type, if the `type` field is present
    Series(Option<SeriesType>),
    Axis(AxisDim),
    Grid,
    Matrix,
    Dataset,
    /// Any other component (title, legend, tooltip, ...)
    Component(Slot),
}

impl EntityKind {
    pub fn classify(slot: Slot, type_field: Option<&str>) -> Self {
        match slot {
            Slot::Series => EntityKind::Series(type_field.map(SeriesType::parse)),
            Slot::XAxis => EntityKind::Axis(AxisDim::X),
            Slot::YAxis => EntityKind::Axis(AxisDim::Y),
            Slot::Grid => EntityKind::Grid,
            Slot::Matrix => EntityKind::Matrix,
            Slot::Dataset => EntityKind::Dataset,
            other => EntityKind::Component(other),
        }
    }

    pub fn is_cartesian_series(&self) -> bool {
        matches!(self, EntityKind::Series(Some(series_type)) if series_type.is_cartesian())
    }
}

/// Kind argument of an add command: `series.bar`, `grid`, `title`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementKind {
    pub slot: Slot,
    pub subtype: Option<String>,
}

impl ElementKind {
    pub fn new(slot: Slot) -> Self {
        Self { slot, subtype: None }
    }

    pub fn series(series_type: &str) -> Self {
        Self {
            slot: Slot::Series,
            subtype: Some(series_type.to_string()),
        }
    }

    pub fn series_type(&self) -> Option<SeriesType> {
        match self.slot {
            Slot::Series => self.subtype.as_deref().map(SeriesType::parse),
            _ => None,
        }
    }

    pub fn is_cartesian_series(&self) -> bool {
        self.series_type().is_some_and(|t| t.is_cartesian())
    }
}

impl FromStr for ElementKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (slot_key, subtype) = match s.split_once('.') {
            Some((slot, subtype)) => (slot, Some(subtype.to_string())),
            None => (s, None),
        };
        let slot =
            Slot::from_key(slot_key).ok_or_else(|| DocumentError::UnknownKind(s.to_string()))?;

        Ok(Self { slot, subtype })
    }
}

impl TryFrom<String> for ElementKind {
    type Error = DocumentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subtype {
            Some(subtype) => write!(f, "{}.{}", self.slot, subtype),
            None => write!(f, "{}", self.slot),
        }
    }
}

/// Placement regime named by an entity's `coordinateSystem` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinateSystem {
    Matrix,
    Cartesian2d,
    Other(String),
}

impl CoordinateSystem {
    pub const MATRIX: &'static str = "matrix";
    pub const CARTESIAN_2D: &'static str = "cartesian2d";

    pub fn parse(name: &str) -> Self {
        match name {
            Self::MATRIX => CoordinateSystem::Matrix,
            Self::CARTESIAN_2D => CoordinateSystem::Cartesian2d,
            other => CoordinateSystem::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CoordinateSystem::Matrix => Self::MATRIX,
            CoordinateSystem::Cartesian2d => Self::CARTESIAN_2D,
            CoordinateSystem::Other(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_keys_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_key(slot.key()), Some(slot));
        }
        assert_eq!(Slot::from_key("grid3D"), None);
    }

    #[test]
    fn test_element_kind_parsing() {
        let kind: ElementKind = "series.bar".parse().unwrap();
        assert_eq!(kind.slot, Slot::Series);
        assert_eq!(kind.subtype.as_deref(), Some("bar"));
        assert!(kind.is_cartesian_series());

        let kind: ElementKind = "title".parse().unwrap();
        assert_eq!(kind, ElementKind::new(Slot::Title));

        assert!("polar".parse::<ElementKind>().is_err());
    }

    #[test]
    fn test_cartesian_series_types() {
        for name in ["line", "bar", "scatter", "effectScatter", "candlestick", "boxplot", "heatmap"] {
            assert!(SeriesType::parse(name).is_cartesian(), "{name} should be cartesian");
        }
        for name in ["pie", "gauge", "sankey", "whatever"] {
            assert!(!SeriesType::parse(name).is_cartesian(), "{name} should not be cartesian");
        }
        assert_eq!(SeriesType::parse("whatever").name(), "whatever");
    }
}
