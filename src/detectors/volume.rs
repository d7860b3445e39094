use super::{require_finite, trailing_window, SectionResult};
use crate::error::DetectorError;
use crate::indicators::{ema_series, mean};
use crate::models::{Candle, CandleSet};
use serde::{Deserialize, Serialize};

/// Candles inspected by the volume-spike rule
pub const VOLUME_WINDOW: usize = 8;

const EMA_PERIOD: usize = 3;
const LEGACY_BASE_CANDLES: usize = 5;
const LEGACY_RECENT_CANDLES: usize = 3;

/// How the "normal" volume level is estimated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeBaseline {
    /// 3-period EMA of the window volumes.
    ///
    /// The latest volume is compared against the EMA as of the bar before
    /// it (`ema[len - 2]`), not the final EMA value, which already includes
    /// the spike. For volumes `[10, 10, 10, 10, 10, 12, 13, 30]` the EMA
    /// series is `[10, 10, 10, 11, 12, 21]`: at factor 1.5 the baseline 12
    /// flags the window (30 > 18), while the final value 21 would not
    /// (30 < 31.5).
    #[default]
    Ema,
    /// Mean of the first 5 window volumes; any of the last 3 may spike
    LegacyMean,
}

impl VolumeBaseline {
    /// True if the window shows a spike above `factor` times the baseline
    pub fn is_spike(&self, volumes: &[f64], factor: f64) -> bool {
        match self {
            VolumeBaseline::Ema => {
                let ema = ema_series(volumes, EMA_PERIOD);
                let (Some(&latest), Some(&baseline)) =
                    (volumes.last(), ema.len().checked_sub(2).and_then(|i| ema.get(i)))
                else {
                    return false;
                };
                latest > baseline * factor
            }
            VolumeBaseline::LegacyMean => {
                let Some(average) = mean(&volumes[..LEGACY_BASE_CANDLES.min(volumes.len())])
                else {
                    return false;
                };
                volumes
                    .iter()
                    .rev()
                    .take(LEGACY_RECENT_CANDLES)
                    .any(|&v| v > average * factor)
            }
        }
    }
}

/// Symbols whose recent volume spiked, ranked by the largest volume in the
/// window (descending, ties keep universe order)
pub fn volume_spike(
    symbols: &[String],
    candles: &CandleSet,
    factor: f64,
    baseline: VolumeBaseline,
) -> SectionResult {
    const NAME: &str = "volume_spike";

    if !factor.is_finite() || factor <= 0.0 {
        return Err(DetectorError::InvalidParameter {
            detector: NAME,
            reason: format!("factor must be a positive number, got {}", factor),
        });
    }

    let mut spikes: Vec<(String, f64)> = Vec::new();

    for symbol in symbols {
        let Some(recent) = trailing_window(NAME, symbol, candles, VOLUME_WINDOW) else {
            continue;
        };

        match evaluate(NAME, symbol, recent, factor, baseline) {
            Ok(Some(max_volume)) => spikes.push((symbol.clone(), max_volume)),
            Ok(None) => {}
            Err(e) => tracing::warn!(detector = NAME, symbol = %symbol, "Skipping symbol: {}", e),
        }
    }

    spikes.sort_by(|a, b| b.1.total_cmp(&a.1));
    let ranked: Vec<String> = spikes.into_iter().map(|(symbol, _)| symbol).collect();

    tracing::debug!(detector = NAME, matched = ?ranked, "Detector finished");
    Ok(ranked)
}

/// Peak window volume if the window spikes
fn evaluate(
    detector: &'static str,
    symbol: &str,
    recent: &[Candle],
    factor: f64,
    baseline: VolumeBaseline,
) -> Result<Option<f64>, DetectorError> {
    require_finite(detector, symbol, recent, "volume", |c| c.volume)?;

    let volumes: Vec<f64> = recent.iter().map(|c| c.volume).collect();
    if !baseline.is_spike(&volumes, factor) {
        return Ok(None);
    }

    Ok(volumes.iter().copied().reduce(f64::max))
}
