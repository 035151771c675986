//! Default payloads for newly added elements.
//!
//! Every payload is deterministic so that adding the same kind twice yields
//! equal entities.

use crate::kind::{ElementKind, SeriesType, Slot};
use crate::model::Fields;
use serde_json::{json, Map, Value};

/// Placeholder rows used when a series is switched back to inline data
pub fn placeholder_data() -> Value {
    json!([10, 20, 30, 40, 50, 60])
}

/// Default payload for an element kind (`series.bar`, `grid`, ...)
pub fn element_default(kind: &ElementKind) -> Fields {
    let value = match kind.slot {
        Slot::Series => series_default(kind.series_type()),
        Slot::XAxis => json!({
            "type": "category",
            "data": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            "boundaryGap": true
        }),
        Slot::YAxis => json!({ "type": "value" }),
        Slot::Grid => json!({
            "left": "10%",
            "right": "10%",
            "top": 60,
            "bottom": 60,
            "containLabel": true,
            "show": true,
            "borderWidth": 1,
            "borderColor": "#ccc"
        }),
        Slot::Title => json!({
            "text": "New Title",
            "subtext": "Subtitle",
            "left": "center",
            "top": "top"
        }),
        Slot::Legend => json!({
            "show": true,
            "left": "center",
            "top": "bottom",
            "orient": "horizontal"
        }),
        Slot::Tooltip => json!({ "show": true, "trigger": "axis" }),
        Slot::DataZoom => json!({ "type": "slider", "start": 0, "end": 100 }),
        Slot::VisualMap => json!({
            "type": "continuous",
            "min": 0,
            "max": 100,
            "calculable": true,
            "orient": "vertical",
            "left": "right",
            "bottom": "center"
        }),
        Slot::Toolbox => json!({
            "show": true,
            "feature": { "saveAsImage": {}, "dataZoom": {}, "restore": {} }
        }),
        Slot::Brush => json!({
            "toolbox": ["rect", "polygon", "keep", "clear"],
            "xAxisIndex": "all",
            "brushLink": "all",
            "outOfBrush": { "colorAlpha": 0.1 }
        }),
        Slot::Timeline => json!({
            "axisType": "category",
            "autoPlay": true,
            "playInterval": 1000,
            "data": ["2002-01-01", "2003-01-01", "2004-01-01"]
        }),
        Slot::Graphic => json!({
            "type": "circle",
            "left": "center",
            "top": "center",
            "shape": { "r": 50 },
            "style": { "fill": "#3b82f6" }
        }),
        Slot::Dataset => json!({
            "source": [
                ["product", "2015", "2016", "2017"],
                ["Matcha Latte", 43.3, 85.8, 93.7],
                ["Milk Tea", 83.1, 73.4, 55.1]
            ]
        }),
        Slot::Matrix => matrix_default(5, 5),
    };

    into_fields(value)
}

/// Matrix with `cols` x `rows` unlabeled cells and no merge regions
pub fn matrix_default(cols: usize, rows: usize) -> Value {
    json!({
        "x": { "data": vec![Value::Null; cols] },
        "y": { "data": vec![Value::Null; rows] },
        "body": { "data": [] }
    })
}

fn series_default(series_type: Option<SeriesType>) -> Value {
    let Some(series_type) = series_type else {
        return json!({});
    };

    match series_type {
        SeriesType::Line => json!({
            "type": "line",
            "name": "New Line",
            "data": [12, 38, 27, 64, 51, 73, 45, 88, 60, 79],
            "smooth": true,
            "lineStyle": { "width": 3 }
        }),
        SeriesType::Bar => json!({
            "type": "bar",
            "name": "New Bar",
            "data": [42, 17, 65, 33, 91, 28, 56, 74, 12, 49]
        }),
        SeriesType::Pie => json!({
            "type": "pie",
            "name": "New Pie",
            "radius": "50%",
            "data": [
                { "value": 1048, "name": "Search Engine" },
                { "value": 735, "name": "Direct" },
                { "value": 580, "name": "Email" },
                { "value": 484, "name": "Union Ads" },
                { "value": 300, "name": "Video Ads" }
            ]
        }),
        SeriesType::Scatter => json!({
            "type": "scatter",
            "name": "New Scatter",
            "symbolSize": 20,
            "data": [[10, 84], [22, 35], [37, 61], [48, 12], [59, 77], [71, 40], [86, 93]]
        }),
        SeriesType::EffectScatter => json!({
            "type": "effectScatter",
            "name": "Effect Scatter",
            "symbolSize": 20,
            "data": [[10, 10], [50, 50]]
        }),
        SeriesType::Candlestick => json!({
            "type": "candlestick",
            "name": "New Candlestick",
            "data": [[20, 34, 10, 38], [40, 35, 30, 50], [31, 38, 33, 44], [38, 15, 5, 42]]
        }),
        SeriesType::Heatmap => json!({
            "type": "heatmap",
            "name": "New Heatmap",
            "data": [
                [0, 0, 5], [0, 1, 1], [0, 2, 0],
                [1, 0, 3], [1, 1, 2], [1, 2, 6],
                [2, 0, 8], [2, 1, 5], [2, 2, 2]
            ],
            "label": { "show": true }
        }),
        SeriesType::Boxplot => json!({
            "type": "boxplot",
            "name": "New Boxplot",
            "data": [[850, 740, 900, 1070, 930, 850, 950, 980, 980, 880, 1000, 980]]
        }),
        SeriesType::Funnel => json!({
            "type": "funnel",
            "name": "New Funnel",
            "left": "10%",
            "top": 60,
            "bottom": 60,
            "width": "80%",
            "sort": "descending",
            "gap": 2,
            "label": { "show": true, "position": "inside" },
            "data": [
                { "value": 60, "name": "Visit" },
                { "value": 40, "name": "Inquiry" },
                { "value": 20, "name": "Order" },
                { "value": 80, "name": "Click" },
                { "value": 100, "name": "Show" }
            ]
        }),
        SeriesType::Gauge => json!({
            "type": "gauge",
            "name": "New Gauge",
            "progress": { "show": true },
            "detail": { "valueAnimation": true, "formatter": "{value}" },
            "data": [{ "value": 50, "name": "Score" }]
        }),
        SeriesType::Graph => json!({
            "type": "graph",
            "name": "New Graph",
            "layout": "force",
            "symbolSize": 50,
            "roam": true,
            "label": { "show": true },
            "data": [{ "name": "Node 1" }, { "name": "Node 2" }, { "name": "Node 3" }],
            "links": [
                { "source": "Node 1", "target": "Node 2" },
                { "source": "Node 2", "target": "Node 3" }
            ]
        }),
        SeriesType::Tree => json!({
            "type": "tree",
            "name": "New Tree",
            "top": "5%",
            "left": "7%",
            "bottom": "5%",
            "right": "20%",
            "symbolSize": 7,
            "data": [{
                "name": "Root",
                "children": [
                    { "name": "Child A", "children": [{ "name": "A1" }, { "name": "A2" }] },
                    { "name": "Child B", "children": [{ "name": "B1" }, { "name": "B2" }] }
                ]
            }]
        }),
        SeriesType::Treemap => json!({
            "type": "treemap",
            "name": "New Treemap",
            "data": [
                { "name": "nodeA", "value": 10, "children": [
                    { "name": "nodeAa", "value": 4 }, { "name": "nodeAb", "value": 6 }
                ] },
                { "name": "nodeB", "value": 20, "children": [{ "name": "nodeBa", "value": 20 }] }
            ]
        }),
        SeriesType::Sunburst => json!({
            "type": "sunburst",
            "name": "New Sunburst",
            "radius": [0, "90%"],
            "data": [{
                "name": "Root",
                "children": [
                    { "name": "Leaf A", "value": 15 },
                    { "name": "Leaf B", "value": 10 }
                ]
            }]
        }),
        SeriesType::Sankey => json!({
            "type": "sankey",
            "name": "New Sankey",
            "layout": "none",
            "emphasis": { "focus": "adjacency" },
            "data": [{ "name": "a" }, { "name": "b" }, { "name": "c" }],
            "links": [
                { "source": "a", "target": "b", "value": 5 },
                { "source": "b", "target": "c", "value": 3 }
            ]
        }),
        SeriesType::Radar => json!({
            "type": "radar",
            "name": "New Radar Series",
            "data": [{ "value": [60, 73, 85, 40, 50, 80], "name": "Budget" }]
        }),
        SeriesType::Lines => json!({
            "type": "lines",
            "name": "New Lines",
            "coordinateSystem": "geo",
            "data": []
        }),
        SeriesType::PictorialBar => json!({
            "type": "pictorialBar",
            "name": "New PictorialBar",
            "data": [10, 50, 20]
        }),
        SeriesType::ThemeRiver => json!({
            "type": "themeRiver",
            "name": "New ThemeRiver",
            "data": [["2015/11/08", 10, "DQ"], ["2015/11/09", 15, "DQ"], ["2015/11/10", 35, "DQ"]]
        }),
        SeriesType::Custom => json!({
            "type": "custom",
            "name": "New Custom",
            "data": [10, 20]
        }),
        SeriesType::Other(name) => json!({ "type": name, "name": format!("New {name}") }),
    }
}

fn into_fields(value: Value) -> Fields {
    match value {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_default_carries_type_and_data() {
        let bar = element_default(&ElementKind::series("bar"));
        assert_eq!(bar.get("type"), Some(&json!("bar")));
        assert!(bar.get("data").is_some_and(Value::is_array));
    }

    #[test]
    fn test_defaults_are_deterministic() {
        let kind = ElementKind::series("line");
        assert_eq!(element_default(&kind), element_default(&kind));
    }

    #[test]
    fn test_matrix_default_dimensions() {
        let matrix = matrix_default(3, 2);
        assert_eq!(matrix["x"]["data"].as_array().map(Vec::len), Some(3));
        assert_eq!(matrix["y"]["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(matrix["body"]["data"], json!([]));
    }

    #[test]
    fn test_unknown_series_type_passes_through() {
        let custom = element_default(&ElementKind::series("wordCloud"));
        assert_eq!(custom.get("type"), Some(&json!("wordCloud")));
    }
}
