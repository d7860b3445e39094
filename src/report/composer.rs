use super::profile::{IntervalSlot, ReportProfile};
use super::render::{AnalysisReport, ChartLinks, ReportSection};
use super::signal::SignalContext;
use crate::api::MarketData;
use crate::config::AppConfig;
use crate::discovery::{rank_by_return, rank_by_value};
use crate::error::ApiError;
use crate::models::{CandleFeed, CandleSet, ChartInterval};
use crate::notify::Notifier;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Knobs the composer needs from configuration
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub quote_currency: String,
    pub universe_size: usize,
    pub chart_base_url: String,
    /// Upper bound for one symbol's candle request, retries included
    pub symbol_timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ComposerSettings {
    fn from(config: &AppConfig) -> Self {
        let provider = &config.provider;
        let retries = provider.max_retries.max(1);
        let backoff_ms = provider.retry_backoff_ms * (2_u64.pow(retries - 1) - 1);

        Self {
            quote_currency: provider.quote_currency.clone(),
            universe_size: config.report.universe_size,
            chart_base_url: config.report.chart_base_url.clone(),
            symbol_timeout: Duration::from_secs(provider.request_timeout_secs * retries as u64)
                + Duration::from_millis(backoff_ms),
            max_concurrent_requests: provider.max_concurrent_requests.max(1),
        }
    }
}

/// Runs a report profile end to end: snapshot, ranking, candle fetches,
/// detectors, rendering and delivery
pub struct ReportComposer<M, N> {
    market: M,
    notifier: N,
    settings: ComposerSettings,
}

impl<M: MarketData, N: Notifier> ReportComposer<M, N> {
    pub fn new(market: M, notifier: N, settings: ComposerSettings) -> Self {
        Self {
            market,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Build the report and hand it to the notifier.
    ///
    /// A notifier failure is logged and not retried; the report is still
    /// returned.
    pub async fn run(&self, profile: &ReportProfile) -> Result<AnalysisReport, ApiError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("report", profile = %profile.kind, run_id = %run_id);

        async {
            let report = self.compose(profile).await?;

            match self.notifier.send(&report.render()).await {
                Ok(()) => tracing::info!("Report delivered"),
                Err(e) => tracing::error!("Report delivery failed, not retrying: {}", e),
            }

            Ok::<_, ApiError>(report)
        }
        .instrument(span)
        .await
    }

    /// Build the report without delivering it
    pub async fn compose(&self, profile: &ReportProfile) -> Result<AnalysisReport, ApiError> {
        let quote = &self.settings.quote_currency;

        tracing::info!("Fetching {} snapshot", quote);
        let snapshot = self.market.snapshot(quote).await.map_err(|e| {
            tracing::error!("Snapshot fetch failed: {}", e);
            e
        })?;

        let by_value = rank_by_value(&snapshot, self.settings.universe_size);
        let by_return = rank_by_return(&snapshot, self.settings.universe_size);
        tracing::info!(
            "Universe: {} by value, {} by return (of {} symbols)",
            by_value.len(),
            by_return.len(),
            snapshot.len()
        );

        let (primary, secondary) = match profile.secondary {
            Some(secondary) => {
                let (primary, secondary) = tokio::join!(
                    self.fetch_candle_set(&by_value, profile.primary),
                    self.fetch_candle_set(&by_value, secondary)
                );
                (primary, Some(secondary))
            }
            None => (self.fetch_candle_set(&by_value, profile.primary).await, None),
        };

        let sections = profile
            .sections
            .iter()
            .map(|spec| {
                let candles = match (spec.slot, &secondary) {
                    (IntervalSlot::Secondary, Some(secondary)) => secondary,
                    _ => &primary,
                };
                let ctx = SignalContext {
                    by_value: &by_value,
                    by_return: &by_return,
                    candles,
                };

                let outcome = spec.signal.evaluate(&ctx);
                match &outcome {
                    Ok(symbols) => {
                        tracing::info!(section = %spec.title, "{} match(es)", symbols.len())
                    }
                    Err(e) => tracing::error!(section = %spec.title, "Section failed: {}", e),
                }

                ReportSection {
                    title: spec.title.clone(),
                    interval: profile.interval(spec.slot),
                    outcome,
                }
            })
            .collect();

        Ok(AnalysisReport {
            title: profile.title.clone(),
            generated_at: Utc::now(),
            sections,
            links: ChartLinks::new(&self.settings.chart_base_url, quote.as_str()),
        })
    }

    /// Candle feeds for every symbol at `interval`.
    ///
    /// With the default concurrency of 1 requests go out one symbol at a time.
    pub async fn fetch_candle_set(&self, symbols: &[String], interval: ChartInterval) -> CandleSet {
        tracing::info!("Fetching {} candles for {} symbols", interval, symbols.len());

        let candles: CandleSet = stream::iter(symbols.iter().cloned())
            .map(|symbol| async move {
                let feed = self.fetch_feed(&symbol, interval).await;
                (symbol, feed)
            })
            .buffer_unordered(self.settings.max_concurrent_requests.max(1))
            .collect()
            .await;

        let ready = candles.values().filter(|feed| feed.is_ready()).count();
        tracing::info!("{}/{} {} feeds ready", ready, candles.len(), interval);
        candles
    }

    async fn fetch_feed(&self, symbol: &str, interval: ChartInterval) -> CandleFeed {
        let request = self
            .market
            .candlestick(symbol, &self.settings.quote_currency, interval);

        match tokio::time::timeout(self.settings.symbol_timeout, request).await {
            Ok(Ok(feed)) => {
                if let CandleFeed::Failed { status, reason } = &feed {
                    tracing::warn!(symbol = %symbol, status = %status, "Candles unavailable: {}", reason);
                }
                feed
            }
            Ok(Err(e)) => {
                tracing::warn!(symbol = %symbol, "Candle request failed: {}", e);
                CandleFeed::failed("request_error", e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    symbol = %symbol,
                    "Candle request timed out after {:?}",
                    self.settings.symbol_timeout
                );
                CandleFeed::failed("timeout", "request timed out")
            }
        }
    }
}
