pub mod candle;
pub mod ticker;

pub use candle::{Candle, CandleFeed, CandleSeries, CandleSet};
pub use ticker::{PriceInfo, Snapshot, TickerEntry};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Status code the provider uses for a successful response
pub const SUCCESS_STATUS: &str = "0000";

/// Candlestick interval supported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
}

impl ChartInterval {
    pub const ALL: [ChartInterval; 9] = [
        ChartInterval::OneMinute,
        ChartInterval::ThreeMinutes,
        ChartInterval::FiveMinutes,
        ChartInterval::TenMinutes,
        ChartInterval::ThirtyMinutes,
        ChartInterval::OneHour,
        ChartInterval::SixHours,
        ChartInterval::TwelveHours,
        ChartInterval::OneDay,
    ];

    /// Path segment used by the candlestick endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartInterval::OneMinute => "1m",
            ChartInterval::ThreeMinutes => "3m",
            ChartInterval::FiveMinutes => "5m",
            ChartInterval::TenMinutes => "10m",
            ChartInterval::ThirtyMinutes => "30m",
            ChartInterval::OneHour => "1h",
            ChartInterval::SixHours => "6h",
            ChartInterval::TwelveHours => "12h",
            ChartInterval::OneDay => "24h",
        }
    }
}

impl fmt::Display for ChartInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartInterval::ALL
            .iter()
            .copied()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| format!("unknown chart interval '{}'", s))
    }
}

/// Parse a provider numeric field.
///
/// The provider encodes numbers as strings (occasionally as JSON numbers).
/// Anything that does not parse becomes NaN, which downstream code treats
/// as "not a number" and excludes.
pub fn parse_decimal(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interval_round_trip_through_str() {
        for interval in ChartInterval::ALL {
            assert_eq!(interval.as_str().parse::<ChartInterval>(), Ok(interval));
        }
        assert!("2h".parse::<ChartInterval>().is_err());
    }

    #[test]
    fn test_interval_deserializes_from_path_segment() {
        let interval: ChartInterval = serde_json::from_value(json!("30m")).unwrap();
        assert_eq!(interval, ChartInterval::ThirtyMinutes);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(&json!("123.5")), 123.5);
        assert_eq!(parse_decimal(&json!(42)), 42.0);
        assert!(parse_decimal(&json!("abc")).is_nan());
        assert!(parse_decimal(&json!(null)).is_nan());
    }
}
