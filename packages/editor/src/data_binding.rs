//! Series data binding: inline `data` versus a `dataset` reference.
//!
//! When a series carries both, the renderer draws the inline rows. That
//! state is reported as [`Binding::Conflict`] and left for the user to
//! resolve with a [`DataSource`] switch.

use crate::mutations::MutationError;
use chartdoc_document::defaults::placeholder_data;
use chartdoc_document::{
    DatasetRef, Document, EntityFields, EntityKind, EntityPath, Fields, SeriesType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a series reads its rows from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    Inline,
    Dataset(usize),
}

/// Current binding state of a series
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Unbound,
    Inline,
    Dataset { dataset: DatasetRef, encode: Fields },
    /// Both inline rows and a dataset reference; inline rows win at render time
    Conflict { dataset: DatasetRef },
}

fn has_inline_rows(series: &Fields) -> bool {
    series
        .get("data")
        .and_then(Value::as_array)
        .is_some_and(|rows| !rows.is_empty())
}

pub fn binding_of(series: &Fields) -> Binding {
    match DatasetRef::of_series(series) {
        Some(dataset) if has_inline_rows(series) => Binding::Conflict { dataset },
        Some(dataset) => Binding::Dataset {
            dataset,
            encode: series
                .get("encode")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        },
        None if series.contains_key("data") => Binding::Inline,
        None => Binding::Unbound,
    }
}

/// Dimension names of a dataset: `dimensions`, else the header row, else the
/// keys of the first object row
pub fn dataset_dimensions(doc: &Document, dataset: DatasetRef) -> Vec<String> {
    let Some(fields) = dataset.resolve(doc) else {
        return Vec::new();
    };

    if let Some(dimensions) = fields.get("dimensions").and_then(Value::as_array) {
        return dimensions.iter().filter_map(dimension_name).collect();
    }

    match fields
        .get("source")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
    {
        Some(Value::Array(header)) => header.iter().filter_map(dimension_name).collect(),
        Some(Value::Object(row)) => row.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn dimension_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(def) => def.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Encode channels a series type understands
pub fn encode_channels(series_type: &SeriesType) -> &'static [&'static str] {
    match series_type {
        SeriesType::Line | SeriesType::Bar => &["x", "y", "itemName", "tooltip", "seriesName"],
        SeriesType::Pie => &["value", "itemName", "tooltip"],
        SeriesType::Scatter => &["x", "y", "label", "tooltip", "itemName"],
        SeriesType::EffectScatter => &["x", "y", "label", "tooltip"],
        SeriesType::Candlestick => &["x", "y", "tooltip"],
        SeriesType::Heatmap => &["x", "y", "value", "tooltip", "label"],
        SeriesType::Graph => &["name", "value", "label", "tooltip"],
        SeriesType::Tree | SeriesType::Treemap | SeriesType::Sunburst => {
            &["name", "value", "tooltip"]
        }
        SeriesType::Funnel => &["value", "itemName", "seriesName"],
        SeriesType::Gauge | SeriesType::Radar => &["value", "itemName"],
        SeriesType::Boxplot => &["x", "y", "tooltip", "itemName"],
        _ => &["x", "y", "value", "itemName"],
    }
}

/// Switch a series between inline rows and a dataset.
///
/// Binding to a dataset drops inline `data` so the dataset is actually used.
/// Switching to inline drops `datasetIndex` and restores placeholder rows
/// when the series has none.
pub fn set_data_source(
    doc: &mut Document,
    path: &EntityPath,
    source: DataSource,
) -> Result<(), MutationError> {
    let is_series = doc
        .entity(path)
        .map(|fields| matches!(EntityKind::classify(path.slot, fields.type_name()), EntityKind::Series(_)))
        .ok_or_else(|| MutationError::EntityNotFound(path.to_string()))?;
    if !is_series {
        return Err(MutationError::NotASeries(path.to_string()));
    }

    if let DataSource::Dataset(index) = source {
        if DatasetRef(index).resolve(doc).is_none() {
            return Err(MutationError::DatasetNotFound(index));
        }
    }

    let series = doc
        .entity_mut(path)
        .ok_or_else(|| MutationError::EntityNotFound(path.to_string()))?;

    match source {
        DataSource::Dataset(index) => {
            series.insert("datasetIndex".to_string(), Value::from(index));
            series.remove("data");
        }
        DataSource::Inline => {
            series.remove("datasetIndex");
            if !has_inline_rows(series) {
                series.insert("data".to_string(), placeholder_data());
            }
        }
    }

    tracing::debug!(%path, ?source, "switched data source");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_binding_states() {
        assert_eq!(binding_of(&fields(json!({}))), Binding::Unbound);
        assert_eq!(binding_of(&fields(json!({ "data": [] }))), Binding::Inline);
        assert_eq!(
            binding_of(&fields(json!({ "data": [1], "datasetIndex": 0 }))),
            Binding::Conflict { dataset: DatasetRef(0) }
        );
        assert!(matches!(
            binding_of(&fields(json!({ "datasetIndex": 1, "encode": { "x": "a" } }))),
            Binding::Dataset { dataset: DatasetRef(1), .. }
        ));
    }

    #[test]
    fn test_dimension_inference() {
        let doc = Document::from_value(json!({
            "dataset": [
                { "dimensions": ["a", { "name": "b" }], "source": [["x", "y"]] },
                { "source": [["Price", "Amount"], [1, 2]] },
                { "source": [{ "k": 1, "v": 2 }] },
                {}
            ]
        }))
        .unwrap();

        assert_eq!(dataset_dimensions(&doc, DatasetRef(0)), vec!["a", "b"]);
        assert_eq!(dataset_dimensions(&doc, DatasetRef(1)), vec!["Price", "Amount"]);
        assert_eq!(dataset_dimensions(&doc, DatasetRef(2)), vec!["k", "v"]);
        assert!(dataset_dimensions(&doc, DatasetRef(3)).is_empty());
        assert!(dataset_dimensions(&doc, DatasetRef(9)).is_empty());
    }

    #[test]
    fn test_switching_sources() {
        let mut doc = Document::from_value(json!({
            "dataset": [{ "source": [] }],
            "series": [{ "type": "bar", "data": [1, 2], "datasetIndex": 0 }]
        }))
        .unwrap();
        let path: EntityPath = "series.0".parse().unwrap();

        set_data_source(&mut doc, &path, DataSource::Dataset(0)).unwrap();
        assert!(doc.get("series.0.data").is_none());

        set_data_source(&mut doc, &path, DataSource::Inline).unwrap();
        assert!(doc.get("series.0.datasetIndex").is_none());
        assert_eq!(doc.get("series.0.data"), Some(&placeholder_data()));

        assert_eq!(
            set_data_source(&mut doc, &path, DataSource::Dataset(3)),
            Err(MutationError::DatasetNotFound(3))
        );
    }

    #[test]
    fn test_unknown_type_uses_generic_channels() {
        assert_eq!(
            encode_channels(&SeriesType::parse("wordCloud")),
            &["x", "y", "value", "itemName"]
        );
    }
}
