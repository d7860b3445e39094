// Pattern detectors module
// Boolean-per-symbol rules over the trailing candle window of each series

pub mod cross;
pub mod pattern;
pub mod streak;
pub mod volume;

pub use cross::{golden_cross, GoldenCrossParams};
pub use pattern::bullish_engulfing;
pub use streak::{continuous_fall, continuous_green, continuous_red, continuous_rise, low_to_high};
pub use volume::{volume_spike, VolumeBaseline, VOLUME_WINDOW};

use crate::error::DetectorError;
use crate::models::{Candle, CandleFeed, CandleSet};

/// Outcome of one detector over a universe.
///
/// `Ok` holds the matching symbols in universe order (or ranked order where
/// the rule ranks); `Err` means the whole section could not be computed.
pub type SectionResult = Result<Vec<String>, DetectorError>;

/// Reject a zero-length window up front
pub(crate) fn require_window(detector: &'static str, window: usize) -> Result<(), DetectorError> {
    if window == 0 {
        return Err(DetectorError::InvalidParameter {
            detector,
            reason: "window must be at least 1 candle".to_string(),
        });
    }
    Ok(())
}

/// Fail with `InvalidCandle` if any selected field in `candles` is not finite
pub(crate) fn require_finite(
    detector: &'static str,
    symbol: &str,
    candles: &[Candle],
    field: &'static str,
    value: impl Fn(&Candle) -> f64,
) -> Result<(), DetectorError> {
    match candles.iter().position(|c| !value(c).is_finite()) {
        Some(index) => Err(DetectorError::InvalidCandle {
            detector,
            symbol: symbol.to_string(),
            field,
            index,
        }),
        None => Ok(()),
    }
}

/// Walk `symbols` in order and collect those whose trailing `window` candles
/// satisfy `rule`.
///
/// Missing feeds, failed feeds and series shorter than `window` are skipped.
/// A rule error only drops that symbol; the rest of the universe is still
/// evaluated.
pub(crate) fn scan<F>(
    detector: &'static str,
    symbols: &[String],
    candles: &CandleSet,
    window: usize,
    rule: F,
) -> Vec<String>
where
    F: Fn(&str, &[Candle]) -> Result<bool, DetectorError>,
{
    let mut matched = Vec::new();

    for symbol in symbols {
        let Some(recent) = trailing_window(detector, symbol, candles, window) else {
            continue;
        };

        match rule(symbol, recent) {
            Ok(true) => matched.push(symbol.clone()),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(detector, symbol = %symbol, "Skipping symbol: {}", e);
            }
        }
    }

    tracing::debug!(detector, matched = ?matched, "Detector finished");
    matched
}

/// The last `window` candles of a trusted series, if there are enough
pub(crate) fn trailing_window<'a>(
    detector: &'static str,
    symbol: &str,
    candles: &'a CandleSet,
    window: usize,
) -> Option<&'a [Candle]> {
    match candles.get(symbol) {
        None => {
            tracing::debug!(detector, symbol = %symbol, "No candle feed");
            None
        }
        Some(CandleFeed::Failed { status, reason }) => {
            tracing::debug!(detector, symbol = %symbol, status = %status, "Feed unavailable: {}", reason);
            None
        }
        Some(CandleFeed::Ready(series)) => {
            let recent = series.last_n(window);
            if recent.is_none() {
                tracing::debug!(
                    detector,
                    symbol = %symbol,
                    "Only {} candles, need {}",
                    series.len(),
                    window
                );
            }
            recent
        }
    }
}
