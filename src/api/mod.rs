pub mod bithumb;
pub mod private;

pub use bithumb::{all_ticker, parse_candlestick, BithumbClient, BITHUMB_API_BASE};
pub use private::{Account, BithumbPrivateClient};

use crate::error::ApiError;
use crate::models::{CandleFeed, ChartInterval, Snapshot, SUCCESS_STATUS};
use async_trait::async_trait;
use serde_json::Value;

/// Market-data provider consumed by the report pipeline
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Ticker statistics for every symbol quoted in `quote`
    async fn snapshot(&self, quote: &str) -> Result<Snapshot, ApiError>;

    /// Candles for one symbol.
    ///
    /// A provider-side failure (non-success status, malformed rows) comes
    /// back as `Ok(CandleFeed::Failed)`; `Err` is reserved for transport and
    /// HTTP errors.
    async fn candlestick(
        &self,
        symbol: &str,
        quote: &str,
        interval: ChartInterval,
    ) -> Result<CandleFeed, ApiError>;
}

/// The `data` member of a payload whose `status` is the success code
pub(crate) fn successful_data<'a>(endpoint: &str, payload: &'a Value) -> Result<&'a Value, ApiError> {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if status != SUCCESS_STATUS {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.to_string(),
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    payload.get("data").ok_or_else(|| ApiError::Payload {
        endpoint: endpoint.to_string(),
        reason: "missing data".to_string(),
    })
}
