use super::parse_decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 24h ticker statistics for one symbol.
///
/// Fields the provider sent as unparseable text are NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub opening_price: f64,
    pub closing_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub prev_closing_price: f64,
    pub units_traded_24h: f64,
    pub acc_trade_value_24h: f64,
    pub fluctate_rate_24h: f64,
}

impl PriceInfo {
    /// Read a provider ticker record. Returns `None` if `value` is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let field = |key: &str| record.get(key).map(parse_decimal).unwrap_or(f64::NAN);

        Some(Self {
            opening_price: field("opening_price"),
            closing_price: field("closing_price"),
            min_price: field("min_price"),
            max_price: field("max_price"),
            prev_closing_price: field("prev_closing_price"),
            units_traded_24h: field("units_traded_24H"),
            acc_trade_value_24h: field("acc_trade_value_24H"),
            fluctate_rate_24h: field("fluctate_rate_24H"),
        })
    }

    /// Session return `(close - open) / open`; `None` when undefined
    pub fn session_return(&self) -> Option<f64> {
        if self.opening_price == 0.0 {
            return None;
        }
        let rate = (self.closing_price - self.opening_price) / self.opening_price;
        rate.is_finite().then_some(rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub info: PriceInfo,
}

/// Market-wide ticker snapshot, in provider payload order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entries: Vec<TickerEntry>,
}

impl Snapshot {
    /// Build from the `data` object of an `ALL_<quote>` ticker response.
    ///
    /// Non-object members (the payload carries a `date` string next to the
    /// symbol records) are skipped.
    pub fn from_data(data: &Map<String, Value>) -> Self {
        let entries = data
            .iter()
            .filter_map(|(symbol, value)| {
                PriceInfo::from_value(value).map(|info| TickerEntry {
                    symbol: symbol.clone(),
                    info,
                })
            })
            .collect();

        Self { entries }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, PriceInfo)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(symbol, info)| TickerEntry { symbol, info })
                .collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceInfo> {
        self.entries
            .iter()
            .find(|entry| entry.symbol == symbol)
            .map(|entry| &entry.info)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
