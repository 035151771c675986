//! Session-start document: a trading dashboard laid out in a matrix.
//!
//! The layout is five columns by six rows. A price chart spans the top-left
//! 4x4 block, volume and MACD panes sit under it, and the right-hand column
//! holds the order book and depth chart. All market data is generated from
//! closed-form curves so the same config always yields the same document.

use crate::kind::Slot;
use crate::model::Document;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Midnight 2024-01-02 UTC, in milliseconds
const SESSION_DAY_MS: i64 = 1_704_153_600_000;
const MINUTE_MS: i64 = 60_000;

const MACD_SHORT: usize = 12;
const MACD_LONG: usize = 26;
const MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarterColors {
    pub up: String,
    pub down: String,
    pub text: String,
    pub subtext: String,
}

impl Default for StarterColors {
    fn default() -> Self {
        Self {
            up: "#ef232a".to_string(),
            down: "#14b143".to_string(),
            text: "#e5e7eb".to_string(),
            subtext: "#9ca3af".to_string(),
        }
    }
}

/// Inputs of the starter layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarterConfig {
    pub initial_price: f64,
    /// Relative amplitude of the simulated price swing
    pub volatility: f64,
    /// Trading minutes to generate
    pub minutes: usize,
    pub matrix_margin: u32,
    pub colors: StarterColors,
}

impl Default for StarterConfig {
    fn default() -> Self {
        Self {
            initial_price: 100.0,
            volatility: 0.02,
            minutes: 240,
            matrix_margin: 10,
            colors: StarterColors::default(),
        }
    }
}

/// Starter document with the default config
pub fn starter_document() -> Document {
    starter_document_with(&StarterConfig::default())
}

pub fn starter_document_with(config: &StarterConfig) -> Document {
    let market = MarketData::generate(config);
    let colors = &config.colors;
    let margin = config.matrix_margin;

    let title = |text: &str, coord: [usize; 2]| {
        json!({
            "text": text,
            "subtext": "",
            "left": 2,
            "top": 2,
            "textStyle": { "fontSize": 12, "fontWeight": "bold", "color": colors.text },
            "subtextStyle": { "fontSize": 10, "color": colors.subtext },
            "coordinateSystem": "matrix",
            "coord": coord
        })
    };

    let grid = |coord: [usize; 2], top: u32, side: u32, bottom: u32| {
        json!({
            "coordinateSystem": "matrix",
            "coord": coord,
            "top": top,
            "bottom": bottom,
            "left": side,
            "right": side
        })
    };

    let root = json!({
        "backgroundColor": "transparent",
        "animation": false,
        "dataset": [
            { "id": "market_data", "source": market.main_source() },
            { "id": "order_book", "source": market.order_book_source() },
            { "id": "depth_data", "source": market.depth_source() }
        ],
        "title": [
            title("Volume", [0, 5]),
            title("MACD", [0, 4]),
            title("Order Book", [4, 0]),
            title("Depth", [4, 5])
        ],
        "tooltip": {
            "trigger": "axis",
            "axisPointer": { "type": "cross" }
        },
        "visualMap": [
            {
                "show": false,
                "seriesIndex": 2,
                "dimension": 6,
                "pieces": [
                    { "value": 1, "color": colors.up },
                    { "value": -1, "color": colors.down }
                ]
            },
            {
                "show": false,
                "seriesIndex": 6,
                "dimension": 2,
                "categories": ["Bid", "Ask"],
                "inRange": { "color": [colors.up, colors.down] }
            }
        ],
        "xAxis": [
            { "type": "time", "show": false, "gridIndex": 0 },
            { "type": "time", "show": false, "gridIndex": 1 },
            { "type": "time", "show": false, "gridIndex": 2 },
            { "type": "value", "show": false, "gridIndex": 3 },
            { "type": "category", "show": false, "gridIndex": 4 }
        ],
        "yAxis": [
            {
                "type": "value",
                "show": false,
                "gridIndex": 0,
                "min": round2(config.initial_price - market.max_abs),
                "max": round2(config.initial_price + market.max_abs)
            },
            { "type": "value", "show": false, "gridIndex": 1 },
            { "type": "value", "show": false, "gridIndex": 2 },
            { "type": "category", "show": false, "gridIndex": 3 },
            { "type": "value", "show": false, "gridIndex": 4 }
        ],
        "grid": [
            grid([0, 0], 0, 0, 0),
            grid([0, 5], 20, 0, 0),
            grid([0, 4], 20, 0, 0),
            grid([4, 0], 15, 2, 2),
            grid([4, 4], 15, 0, 0)
        ],
        "series": [
            {
                "name": "Price",
                "type": "candlestick",
                "datasetIndex": 0,
                "xAxisIndex": 0,
                "yAxisIndex": 0,
                "encode": {
                    "x": "Timestamp",
                    "y": ["Open", "Close", "Low", "High"],
                    "tooltip": ["Open", "Close", "Low", "High"]
                },
                "itemStyle": {
                    "color": colors.up,
                    "color0": colors.down,
                    "borderColor": colors.up,
                    "borderColor0": colors.down
                }
            },
            {
                "name": "MA5",
                "type": "line",
                "datasetIndex": 0,
                "xAxisIndex": 0,
                "yAxisIndex": 0,
                "encode": { "x": "Timestamp", "y": "MA5" },
                "lineStyle": { "opacity": 0.5, "width": 1 },
                "symbol": "none"
            },
            {
                "name": "Volume",
                "type": "bar",
                "datasetIndex": 0,
                "xAxisIndex": 1,
                "yAxisIndex": 1,
                "encode": { "x": "Timestamp", "y": "Volume" }
            },
            {
                "name": "MACD",
                "type": "bar",
                "datasetIndex": 0,
                "xAxisIndex": 2,
                "yAxisIndex": 2,
                "encode": { "x": "Timestamp", "y": "Hist" },
                "itemStyle": { "color": colors.text }
            },
            {
                "name": "DIF",
                "type": "line",
                "datasetIndex": 0,
                "xAxisIndex": 2,
                "yAxisIndex": 2,
                "encode": { "x": "Timestamp", "y": "MACD" },
                "lineStyle": { "width": 1, "color": "#fff" },
                "symbol": "none"
            },
            {
                "name": "DEA",
                "type": "line",
                "datasetIndex": 0,
                "xAxisIndex": 2,
                "yAxisIndex": 2,
                "encode": { "x": "Timestamp", "y": "Signal" },
                "lineStyle": { "width": 1, "color": "#f00" },
                "symbol": "none"
            },
            {
                "name": "Order Book",
                "type": "bar",
                "datasetIndex": 1,
                "xAxisIndex": 3,
                "yAxisIndex": 3,
                "encode": { "x": "Amount", "y": "Price" },
                "label": { "show": true, "position": "right" }
            },
            {
                "name": "Depth",
                "type": "line",
                "datasetIndex": 2,
                "xAxisIndex": 4,
                "yAxisIndex": 4,
                "encode": { "x": "Price", "y": "Volume" },
                "step": "start",
                "areaStyle": { "opacity": 0.2 },
                "lineStyle": { "width": 1 }
            }
        ],
        "matrix": {
            "left": margin,
            "right": margin,
            "top": margin,
            "bottom": margin,
            "x": { "show": false, "data": vec![Value::Null; 5] },
            "y": { "show": false, "data": vec![Value::Null; 6] },
            "body": {
                "data": [
                    { "coord": [[0, 3], [0, 3]], "mergeCells": true },
                    { "coord": [[0, 3], [5, 5]], "mergeCells": true },
                    { "coord": [[0, 3], [4, 4]], "mergeCells": true },
                    { "coord": [[4, 4], [0, 3]], "mergeCells": true },
                    { "coord": [[4, 4], [4, 5]], "mergeCells": true }
                ]
            }
        }
    });

    let doc = Document::from_value(root).unwrap_or_default();
    tracing::debug!(
        rows = market.rows.len(),
        series = doc.count(Slot::Series),
        "generated starter document"
    );
    doc
}

struct Candle {
    time: i64,
    open: f64,
    close: f64,
    low: f64,
    high: f64,
    volume: u64,
}

struct MarketData {
    rows: Vec<Candle>,
    last_price: f64,
    /// Largest distance of any high/low from the opening reference price
    max_abs: f64,
}

impl MarketData {
    fn generate(config: &StarterConfig) -> Self {
        let base = config.initial_price;
        let swing = base * config.volatility;
        // 09:30 to 11:30, then 13:00 onwards
        let open_ms = SESSION_DAY_MS + (9 * 60 + 30) * MINUTE_MS;
        let break_start = SESSION_DAY_MS + (11 * 60 + 30) * MINUTE_MS;
        let resume_ms = SESSION_DAY_MS + 13 * 60 * MINUTE_MS;

        let mut rows = Vec::with_capacity(config.minutes);
        let mut max_abs: f64 = 0.0;
        let mut price = base;

        for i in 0..config.minutes {
            let mut time = open_ms + i as i64 * MINUTE_MS;
            if time > break_start {
                time = resume_ms + (time - break_start - MINUTE_MS);
            }

            let t = i as f64;
            let open = price;
            let close = round2(base + swing * ((t / 17.0).sin() + 0.4 * (t / 5.0).cos()));
            let wick = 0.05 + 0.05 * (t / 3.0).sin().abs();
            let high = round2(open.max(close) + wick);
            let low = round2(open.min(close) - wick);
            let volume = 500 + ((t * 37.0).sin().abs() * 1000.0).round() as u64;

            max_abs = max_abs.max((high - base).abs()).max((low - base).abs());
            rows.push(Candle {
                time,
                open,
                close,
                low,
                high,
                volume,
            });
            price = close;
        }

        Self {
            rows,
            last_price: price,
            max_abs,
        }
    }

    fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.close).collect()
    }

    fn main_source(&self) -> Value {
        let closes = self.closes();
        let short = ema(&closes, MACD_SHORT);
        let long = ema(&closes, MACD_LONG);
        let k = 2.0 / (MACD_SIGNAL as f64 + 1.0);

        let mut source = vec![json!([
            "Timestamp", "Open", "Close", "Low", "High", "Volume", "VolColor", "MA5", "MA10",
            "MA20", "MACD", "Signal", "Hist"
        ])];
        let mut signal: Option<f64> = None;

        for (i, row) in self.rows.iter().enumerate() {
            let vol_color = if row.close >= row.open { 1 } else { -1 };
            let ma = |period: usize| -> Value {
                if i + 1 < period {
                    return json!("");
                }
                let window = &closes[i + 1 - period..=i];
                json!(round2(window.iter().sum::<f64>() / period as f64))
            };

            let (dif, sig, hist) = if i < MACD_LONG {
                (json!(""), json!(""), json!(""))
            } else {
                let dif = short[i] - long[i];
                let next = match signal {
                    Some(prev) => dif * k + prev * (1.0 - k),
                    None => dif,
                };
                signal = Some(next);
                (json!(round4(dif)), json!(round4(next)), json!(round4(dif - next)))
            };

            source.push(json!([
                row.time, row.open, row.close, row.low, row.high, row.volume, vol_color,
                ma(5), ma(10), ma(20), dif, sig, hist
            ]));
        }

        Value::Array(source)
    }

    fn order_book_source(&self) -> Value {
        let mut source = vec![json!(["Price", "Amount", "Type"])];
        for i in 0..10_i32 {
            let offset = f64::from(i - 5) * 0.01 + 0.01;
            let level = round2(self.last_price + offset);
            let amount = 10.0 + (f64::from(i) * 1.7).sin().abs() * 200.0;
            let side = if level < self.last_price { "Bid" } else { "Ask" };
            source.push(json!([level, amount.round() as u64, side]));
        }
        Value::Array(source)
    }

    fn depth_source(&self) -> Value {
        let mut source = vec![json!(["Price", "Volume", "Type"])];
        for (side, phase) in [("Ask", 0.0), ("Bid", 1.3)] {
            let mut cumulative = 0_u64;
            for i in 0..20_u32 {
                cumulative += ((f64::from(i) + phase).cos().abs() * 1000.0).round() as u64;
                source.push(json!([i, cumulative, side]));
            }
        }
        Value::Array(source)
    }
}

fn ema(data: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter();
    let Some(&first) = iter.next() else {
        return out;
    };

    let mut current = first;
    out.push(current);
    for &value in iter {
        current = value * k + current * (1.0 - k);
        out.push(current);
    }
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityFields;

    #[test]
    fn test_starter_is_deterministic() {
        assert_eq!(starter_document(), starter_document());
    }

    #[test]
    fn test_starter_layout() {
        let doc = starter_document();

        assert_eq!(doc.count(Slot::Grid), 5);
        assert_eq!(doc.count(Slot::XAxis), 5);
        assert_eq!(doc.count(Slot::YAxis), 5);
        assert_eq!(doc.count(Slot::Series), 8);
        assert_eq!(doc.count(Slot::Dataset), 3);
        assert_eq!(doc.get("matrix.x.data").and_then(Value::as_array).map(Vec::len), Some(5));
        assert_eq!(doc.get("matrix.y.data").and_then(Value::as_array).map(Vec::len), Some(6));
        assert_eq!(doc.get("matrix.body.data.0.coord"), Some(&json!([[0, 3], [0, 3]])));

        for grid in doc.entities(Slot::Grid) {
            assert!(grid.fields.in_matrix());
        }
    }

    #[test]
    fn test_order_book_amounts_are_whole_and_positive() {
        let doc = starter_document();
        let book = doc
            .entities(Slot::Dataset)
            .into_iter()
            .find(|dataset| dataset.fields.get("id") == Some(&json!("order_book")))
            .and_then(|dataset| dataset.fields.get("source").and_then(Value::as_array).cloned())
            .unwrap();

        assert_eq!(book.len(), 11);
        for row in &book[1..] {
            let amount = row[1].as_u64().unwrap();
            assert!((10..=210).contains(&amount));
        }
    }

    #[test]
    fn test_market_rows_have_header_and_body() {
        let config = StarterConfig {
            minutes: 30,
            ..StarterConfig::default()
        };
        let doc = starter_document_with(&config);
        let source = doc.get("dataset.0.source").and_then(Value::as_array).unwrap();

        assert_eq!(source.len(), 31);
        assert_eq!(source[0][0], json!("Timestamp"));
        assert_eq!(source[1][7], json!(""));
        assert!(source[30][10].is_number());
    }

    #[test]
    fn test_ema_of_empty_input() {
        assert!(ema(&[], 12).is_empty());
        assert_eq!(ema(&[2.0, 2.0], 3), vec![2.0, 2.0]);
    }
}
