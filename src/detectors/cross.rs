use super::{require_finite, scan, SectionResult};
use crate::error::DetectorError;
use crate::indicators::{has_crossover_within, sma_series};
use crate::models::CandleSet;
use serde::{Deserialize, Serialize};

/// Golden-cross settings: SMA periods and how many trailing bars to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenCrossParams {
    pub short_period: usize,
    pub long_period: usize,
    pub lookback: usize,
}

impl Default for GoldenCrossParams {
    fn default() -> Self {
        Self {
            short_period: 50,
            long_period: 200,
            lookback: 10,
        }
    }
}

impl GoldenCrossParams {
    pub fn new(short_period: usize, long_period: usize, lookback: usize) -> Self {
        Self {
            short_period,
            long_period,
            lookback,
        }
    }

    fn validate(&self) -> Result<(), DetectorError> {
        let reason = if self.short_period == 0 {
            "short period must be at least 1"
        } else if self.long_period <= self.short_period {
            "long period must exceed short period"
        } else if self.lookback == 0 {
            "lookback must be at least 1 bar"
        } else {
            return Ok(());
        };

        Err(DetectorError::InvalidParameter {
            detector: "golden_cross",
            reason: reason.to_string(),
        })
    }
}

/// Symbols whose short SMA crossed above the long SMA within the last
/// `lookback` bars.
///
/// Only the trailing `long_period + lookback` closes are read.
pub fn golden_cross(
    symbols: &[String],
    candles: &CandleSet,
    params: GoldenCrossParams,
) -> SectionResult {
    const NAME: &str = "golden_cross";
    params.validate()?;

    // Both averages need a defined value on the bar before a cross
    let min_candles = params.long_period + 1;

    Ok(scan(NAME, symbols, candles, min_candles, |symbol, _| {
        let Some(series) = candles.get(symbol).and_then(|feed| feed.series()) else {
            return Ok(false);
        };

        // Bars older than this cannot move either average inside the lookback
        let tail = series
            .last_n(params.long_period + params.lookback)
            .unwrap_or(series.candles.as_slice());
        require_finite(NAME, symbol, tail, "close", |c| c.close)?;

        let closes: Vec<f64> = tail.iter().map(|c| c.close).collect();
        let short = sma_series(&closes, params.short_period);
        let long = sma_series(&closes, params.long_period);

        Ok(has_crossover_within(&short, &long, params.lookback))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::fixtures::{from_closes, ready, set, symbols};

    #[test]
    fn test_recent_cross_detected() {
        let candles = set(vec![
            ready("UP", from_closes(&[10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0, 15.0])),
            ready("DOWN", from_closes(&[15.0, 12.0, 9.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0])),
        ]);

        let params = GoldenCrossParams::new(2, 4, 3);
        let result = golden_cross(&symbols(&["UP", "DOWN"]), &candles, params).unwrap();
        assert_eq!(result, vec!["UP"]);
    }

    #[test]
    fn test_cross_outside_lookback_ignored() {
        let candles = set(vec![ready(
            "UP",
            from_closes(&[10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0, 15.0]),
        )]);

        let params = GoldenCrossParams::new(2, 4, 2);
        assert!(golden_cross(&symbols(&["UP"]), &candles, params).unwrap().is_empty());
    }

    #[test]
    fn test_bad_close_before_averaging_range_ignored() {
        let mut closes = vec![f64::NAN, 50.0, 50.0];
        closes.extend([10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0, 15.0]);
        let candles = set(vec![ready("UP", from_closes(&closes))]);

        let params = GoldenCrossParams::new(2, 4, 3);
        assert_eq!(golden_cross(&symbols(&["UP"]), &candles, params).unwrap(), vec!["UP"]);
    }

    #[test]
    fn test_bad_close_inside_averaging_range_skips_symbol() {
        let mut closes = vec![10.0, 9.0, 8.0, 7.0, 6.0, 7.0, 9.0, 12.0, 15.0];
        closes[5] = f64::NAN;
        let candles = set(vec![ready("UP", from_closes(&closes))]);

        let params = GoldenCrossParams::new(2, 4, 3);
        assert!(golden_cross(&symbols(&["UP"]), &candles, params).unwrap().is_empty());
    }

    #[test]
    fn test_short_series_skipped() {
        let candles = set(vec![ready("S", from_closes(&[1.0, 2.0, 3.0, 4.0]))]);
        let params = GoldenCrossParams::new(2, 4, 3);
        assert!(golden_cross(&symbols(&["S"]), &candles, params).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_periods_fail_section() {
        let params = GoldenCrossParams::new(20, 5, 3);
        assert!(golden_cross(&symbols(&["X"]), &set(vec![]), params).is_err());
    }
}
