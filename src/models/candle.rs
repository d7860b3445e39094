use super::{parse_decimal, ChartInterval};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One interval bar.
///
/// Numeric fields that failed to parse hold NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Candle {
    /// Build a candle from a provider row `[timestamp, open, close, high, low, volume]`
    ///
    /// Returns `None` when the row has fewer than six cells.
    pub fn from_row(row: &[Value]) -> Option<Self> {
        if row.len() < 6 {
            return None;
        }

        let timestamp = match &row[0] {
            Value::Number(n) => n.as_i64().unwrap_or_default(),
            Value::String(s) => s.trim().parse::<i64>().unwrap_or_default(),
            _ => 0,
        };

        Some(Self {
            timestamp,
            open: parse_decimal(&row[1]),
            close: parse_decimal(&row[2]),
            high: parse_decimal(&row[3]),
            low: parse_decimal(&row[4]),
            volume: parse_decimal(&row[5]),
        })
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Close above open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close below open
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Candles for one symbol and one interval, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub interval: ChartInterval,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: impl Into<String>, interval: ChartInterval, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// The `n` most recent candles, or `None` if the series is shorter than `n`
    pub fn last_n(&self, n: usize) -> Option<&[Candle]> {
        if self.candles.len() < n {
            return None;
        }
        Some(&self.candles[self.candles.len() - n..])
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

/// Result of one candlestick request, tagged by provider outcome
#[derive(Debug, Clone, PartialEq)]
pub enum CandleFeed {
    Ready(CandleSeries),
    Failed { status: String, reason: String },
}

impl CandleFeed {
    pub fn failed(status: impl Into<String>, reason: impl Into<String>) -> Self {
        CandleFeed::Failed {
            status: status.into(),
            reason: reason.into(),
        }
    }

    /// The series, if the provider reported success
    pub fn series(&self) -> Option<&CandleSeries> {
        match self {
            CandleFeed::Ready(series) => Some(series),
            CandleFeed::Failed { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CandleFeed::Ready(_))
    }
}

/// Candle feeds for a universe at one interval, keyed by symbol
pub type CandleSet = HashMap<String, CandleFeed>;
