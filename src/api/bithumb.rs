use super::{successful_data, MarketData};
use crate::config::ProviderConfig;
use crate::error::ApiError;
use crate::models::{
    Candle, CandleFeed, CandleSeries, ChartInterval, PriceInfo, Snapshot, SUCCESS_STATUS,
};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

pub const BITHUMB_API_BASE: &str = "https://api.bithumb.com";

/// Ticker covering every listed symbol for a quote currency
pub fn all_ticker(quote: &str) -> String {
    format!("ALL_{}", quote)
}

type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for the public Bithumb REST API
///
/// Cloneable; clones share the HTTP connection pool and the rate limiter.
#[derive(Clone)]
pub struct BithumbClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<DirectRateLimiter>,
    timeout_secs: u64,
    max_retries: u32,
    retry_backoff: Duration,
}

impl BithumbClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
            timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rate-limited GET with retry on 429, 5xx and transport errors
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            self.rate_limiter.until_ready().await;

            let error = match self
                .client
                .get(&url)
                .header("accept", "application/json")
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<Value>().await.map_err(|e| ApiError::Payload {
                            endpoint: path.to_string(),
                            reason: e.to_string(),
                        });
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error = ApiError::Http {
                        endpoint: path.to_string(),
                        status: status.as_u16(),
                        body,
                    };

                    // Other 4xx errors - don't retry
                    if status.as_u16() != 429 && !status.is_server_error() {
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_timeout() => ApiError::Timeout {
                    endpoint: path.to_string(),
                    seconds: self.timeout_secs,
                },
                Err(e) => ApiError::Transport(e),
            };

            if attempt < self.max_retries {
                let backoff = self.retry_backoff * 2_u32.pow(attempt - 1);
                tracing::warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {:?}...",
                    attempt,
                    self.max_retries,
                    path,
                    error,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| ApiError::Payload {
            endpoint: path.to_string(),
            reason: "no attempts were made".to_string(),
        }))
    }

    /// Raw ticker payload for `ticker` (e.g. `BTC_KRW` or `ALL_KRW`)
    pub async fn ticker(&self, ticker: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/public/ticker/{}", ticker)).await
    }

    /// Ticker statistics for a single symbol
    pub async fn price_info(&self, symbol: &str, quote: &str) -> Result<PriceInfo, ApiError> {
        let endpoint = format!("/public/ticker/{}_{}", symbol, quote);
        let payload = self.get_json(&endpoint).await?;
        let data = successful_data(&endpoint, &payload)?;

        PriceInfo::from_value(data).ok_or_else(|| ApiError::Payload {
            endpoint,
            reason: "ticker data is not an object".to_string(),
        })
    }

    /// Raw orderbook payload
    pub async fn orderbook(&self, ticker: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/public/orderbook/{}", ticker)).await
    }

    /// Raw recent-transactions payload
    pub async fn transaction_history(&self, ticker: &str) -> Result<Value, ApiError> {
        self.get_json(&format!("/public/transaction_history/{}", ticker))
            .await
    }
}

#[async_trait]
impl MarketData for BithumbClient {
    async fn snapshot(&self, quote: &str) -> Result<Snapshot, ApiError> {
        let endpoint = format!("/public/ticker/{}", all_ticker(quote));
        let payload = self.get_json(&endpoint).await?;
        let data = successful_data(&endpoint, &payload)?;

        let records = data.as_object().ok_or_else(|| ApiError::Payload {
            endpoint: endpoint.clone(),
            reason: "ticker data is not an object".to_string(),
        })?;

        let snapshot = Snapshot::from_data(records);
        tracing::debug!("Fetched snapshot with {} symbols", snapshot.len());
        Ok(snapshot)
    }

    async fn candlestick(
        &self,
        symbol: &str,
        quote: &str,
        interval: ChartInterval,
    ) -> Result<CandleFeed, ApiError> {
        let endpoint = format!("/public/candlestick/{}_{}/{}", symbol, quote, interval);
        let payload = self.get_json(&endpoint).await?;
        Ok(parse_candlestick(symbol, interval, &payload))
    }
}

/// Turn a candlestick payload into a tagged feed.
///
/// Non-success status and malformed rows yield `CandleFeed::Failed`.
pub fn parse_candlestick(symbol: &str, interval: ChartInterval, payload: &Value) -> CandleFeed {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if status != SUCCESS_STATUS {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("provider reported failure");
        return CandleFeed::failed(status, message);
    }

    let Some(rows) = payload.get("data").and_then(Value::as_array) else {
        return CandleFeed::failed(status, "candlestick data is not an array");
    };

    let mut candles = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match row.as_array().and_then(|cells| Candle::from_row(cells)) {
            Some(candle) => candles.push(candle),
            None => return CandleFeed::failed(status, format!("malformed candle row {}", i)),
        }
    }

    CandleFeed::Ready(CandleSeries::new(symbol, interval, candles))
}
