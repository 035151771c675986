//! Consistency checks over a document.
//!
//! Nothing here blocks an edit; the engine tolerates every state reported
//! below. Diagnostics are for surfacing states the user probably did not
//! intend.

use crate::config::EditorConfig;
use crate::data_binding::{binding_of, dataset_dimensions, encode_channels, Binding};
use crate::matrix::{dimensions, merge_regions};
use chartdoc_document::visitor::for_each_entity;
use chartdoc_document::{
    AxisDim, AxisRef, DatasetRef, Document, EntityFields, GridRef, SeriesType, Slot,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// A finding from a check rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,

    /// The rule that generated this diagnostic
    pub rule: String,

    pub message: String,

    /// Entity the finding is about, if any
    pub path: Option<String>,

    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            rule: rule.into(),
            message: message.into(),
            path: None,
            suggestion: None,
        }
    }

    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, rule, message)
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, rule, message)
    }

    pub fn info(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, rule, message)
    }

    pub fn at(mut self, path: impl ToString) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Trait for implementing document checks
pub trait CheckRule {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    fn check(&self, doc: &Document) -> Vec<Diagnostic>;
}

/// Series carrying both inline rows and a dataset reference
pub struct BindingConflictRule;

impl CheckRule for BindingConflictRule {
    fn name(&self) -> &'static str {
        "binding-conflict"
    }

    fn description(&self) -> &'static str {
        "Series should not carry inline data and a dataset at once"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        doc.entities(Slot::Series)
            .into_iter()
            .filter_map(|series| match binding_of(series.fields) {
                Binding::Conflict { dataset } => Some(
                    Diagnostic::warning(
                        self.name(),
                        format!(
                            "{} has inline data and datasetIndex {}; the inline data is drawn",
                            series.path, dataset.0
                        ),
                    )
                    .at(series.path)
                    .with_suggestion("Remove `data` or switch the series to inline rows"),
                ),
                _ => None,
            })
            .collect()
    }
}

/// Explicit indices pointing past the end of their target slot
pub struct DanglingReferenceRule;

impl CheckRule for DanglingReferenceRule {
    fn name(&self) -> &'static str {
        "dangling-reference"
    }

    fn description(&self) -> &'static str {
        "Cross-references should point at existing entities"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut report = |path: String, key: &str, index: usize| {
            diagnostics.push(
                Diagnostic::warning(
                    self.name(),
                    format!("{} has {} {} but no such entity exists", path, key, index),
                )
                .at(path),
            );
        };

        for dim in [AxisDim::X, AxisDim::Y] {
            for axis in doc.entities(dim.slot()) {
                if let Some(index) = axis.fields.index_field("gridIndex") {
                    if GridRef(index).resolve(doc).is_none() {
                        report(axis.path.to_string(), "gridIndex", index);
                    }
                }
            }
        }

        for series in doc.entities(Slot::Series) {
            if let Some(dataset) = DatasetRef::of_series(series.fields) {
                if dataset.resolve(doc).is_none() {
                    report(series.path.to_string(), "datasetIndex", dataset.0);
                }
            }

            if !series.kind().is_cartesian_series() {
                continue;
            }
            for dim in [AxisDim::X, AxisDim::Y] {
                if let Some(index) = series.fields.index_field(dim.index_key()) {
                    if AxisRef::new(dim, index).resolve(doc).is_none() {
                        report(series.path.to_string(), dim.index_key(), index);
                    }
                }
            }
        }

        diagnostics
    }
}

/// Encode mappings naming channels the series type ignores, or dimensions
/// the bound dataset does not have
pub struct EncodeMappingRule;

impl CheckRule for EncodeMappingRule {
    fn name(&self) -> &'static str {
        "unknown-encode"
    }

    fn description(&self) -> &'static str {
        "Encode channels and dimensions should exist for the bound dataset"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for series in doc.entities(Slot::Series) {
            let Binding::Dataset { dataset, encode } = binding_of(series.fields) else {
                continue;
            };
            let dimensions = dataset_dimensions(doc, dataset);
            let channels = series
                .fields
                .type_name()
                .map(|name| encode_channels(&SeriesType::parse(name)));

            for (channel, mapped) in &encode {
                if channels.is_some_and(|channels| !channels.contains(&channel.as_str())) {
                    diagnostics.push(
                        Diagnostic::warning(
                            self.name(),
                            format!("{} maps unknown channel `{}`", series.path, channel),
                        )
                        .at(series.path),
                    );
                }

                // Numeric dimension indices and empty dimension lists are not checked
                if dimensions.is_empty() {
                    continue;
                }
                let names: Vec<&str> = match mapped {
                    Value::String(name) => vec![name.as_str()],
                    Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                    _ => Vec::new(),
                };
                for name in names {
                    if !dimensions.iter().any(|dimension| dimension == name) {
                        diagnostics.push(
                            Diagnostic::warning(
                                self.name(),
                                format!(
                                    "{} encodes `{}` as `{}`, which dataset.{} does not define",
                                    series.path, channel, name, dataset.0
                                ),
                            )
                            .at(series.path)
                            .with_suggestion(format!("Known dimensions: {}", dimensions.join(", "))),
                        );
                    }
                }
            }
        }

        diagnostics
    }
}

/// Merge regions that share cells
pub struct OverlappingMergeRule;

impl CheckRule for OverlappingMergeRule {
    fn name(&self) -> &'static str {
        "overlapping-merge"
    }

    fn description(&self) -> &'static str {
        "Merged cell regions must not overlap"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let regions = merge_regions(doc);
        let mut diagnostics = Vec::new();

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                if a.intersects(b) {
                    diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!("Merged regions {} and {} overlap", a, b),
                        )
                        .at("matrix")
                        .with_suggestion("Unmerge one of the regions and merge again"),
                    );
                }
            }
        }

        diagnostics
    }
}

/// Matrix-placed entities outside the current grid of cells
pub struct CoordOutOfBoundsRule {
    pub default_size: usize,
}

impl CheckRule for CoordOutOfBoundsRule {
    fn name(&self) -> &'static str {
        "coord-out-of-bounds"
    }

    fn description(&self) -> &'static str {
        "Matrix coordinates should fall inside the matrix"
    }

    fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        if doc.matrix().is_none() {
            return Vec::new();
        }

        let (cols, rows) = dimensions(doc, self.default_size);
        let mut diagnostics = Vec::new();

        for_each_entity(doc, |path, fields| {
            if !fields.in_matrix() {
                return;
            }
            if let Some(coord) = fields.matrix_coord() {
                if coord.col >= cols || coord.row >= rows {
                    diagnostics.push(
                        Diagnostic::info(
                            "coord-out-of-bounds",
                            format!("{} sits at {} outside the {}x{} matrix", path, coord, cols, rows),
                        )
                        .at(path),
                    );
                }
            }
        });

        diagnostics
    }
}

/// Registry of check rules
pub struct CheckRegistry {
    rules: Vec<Box<dyn CheckRule>>,
}

impl CheckRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            rules: vec![
                Box::new(BindingConflictRule),
                Box::new(DanglingReferenceRule),
                Box::new(EncodeMappingRule),
                Box::new(OverlappingMergeRule),
                Box::new(CoordOutOfBoundsRule {
                    default_size: config.default_matrix_size,
                }),
            ],
        }
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn CheckRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn CheckRule>] {
        &self.rules
    }

    /// Run every rule; errors sort first
    pub fn check(&self, doc: &Document) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> =
            self.rules.iter().flat_map(|rule| rule.check(doc)).collect();
        diagnostics.sort_by_key(|diagnostic| diagnostic.level as u8);
        diagnostics
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    fn rules_hit(d: &Document) -> Vec<String> {
        CheckRegistry::new()
            .check(d)
            .into_iter()
            .map(|diagnostic| diagnostic.rule)
            .collect()
    }

    #[test]
    fn test_clean_document_has_no_findings() {
        assert!(CheckRegistry::new().check(&Document::new()).is_empty());
    }

    #[test]
    fn test_binding_conflict() {
        let d = doc(json!({
            "dataset": [{ "source": [] }],
            "series": [{ "type": "pie", "data": [1], "datasetIndex": 0 }]
        }));
        assert_eq!(rules_hit(&d), vec!["binding-conflict"]);
    }

    #[test]
    fn test_dangling_axis_reference() {
        let d = doc(json!({
            "grid": [{}],
            "xAxis": [{ "gridIndex": 2 }],
            "yAxis": [{}],
            "series": [{ "type": "line", "xAxisIndex": 5 }]
        }));

        let findings = CheckRegistry::new().check(&d);
        let paths: Vec<_> = findings.iter().filter_map(|d| d.path.as_deref()).collect();
        assert_eq!(paths, vec!["xAxis.0", "series.0"]);
    }

    #[test]
    fn test_encode_mapping() {
        let d = doc(json!({
            "dataset": [{ "source": [["Time", "Price"], [0, 1]] }],
            "series": [
                { "type": "line", "datasetIndex": 0, "encode": { "x": "Time", "y": "Price" } },
                { "type": "pie", "datasetIndex": 0, "encode": { "value": "Amount", "x": "Time" } }
            ]
        }));

        let findings = CheckRegistry::new().check(&d);
        let messages: Vec<_> = findings.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "series.1 encodes `value` as `Amount`, which dataset.0 does not define",
                "series.1 maps unknown channel `x`",
            ]
        );
    }

    #[test]
    fn test_overlap_sorts_before_info() {
        let d = doc(json!({
            "matrix": {
                "x": { "data": [null, null] },
                "y": { "data": [null, null] },
                "body": { "data": [
                    { "coord": [[0, 1], [0, 0]], "mergeCells": true },
                    { "coord": [[1, 1], [0, 1]], "mergeCells": true }
                ] }
            },
            "title": { "coordinateSystem": "matrix", "coord": [4, 0] }
        }));

        assert_eq!(rules_hit(&d), vec!["overlapping-merge", "coord-out-of-bounds"]);
    }
}
