//! Streak detectors
//!
//! Each rule looks at the trailing window of a series and checks a
//! monotonic close sequence or a uniform candle colour.

use super::{require_finite, require_window, scan, SectionResult};
use crate::models::CandleSet;

/// Closes strictly increasing over the last `n + 1` candles (`n` comparisons)
pub fn continuous_rise(symbols: &[String], candles: &CandleSet, n: usize) -> SectionResult {
    const NAME: &str = "continuous_rise";
    require_window(NAME, n)?;

    Ok(scan(NAME, symbols, candles, n + 1, |symbol, recent| {
        require_finite(NAME, symbol, recent, "close", |c| c.close)?;
        Ok(recent.windows(2).all(|w| w[1].close > w[0].close))
    }))
}

/// Closes strictly decreasing over the last `n` candles (`n - 1` comparisons)
///
/// The window is one candle shorter than [`continuous_rise`] for the same `n`.
pub fn continuous_fall(symbols: &[String], candles: &CandleSet, n: usize) -> SectionResult {
    const NAME: &str = "continuous_fall";
    require_window(NAME, n)?;

    Ok(scan(NAME, symbols, candles, n, |symbol, recent| {
        require_finite(NAME, symbol, recent, "close", |c| c.close)?;
        Ok(recent.windows(2).all(|w| w[1].close < w[0].close))
    }))
}

/// Every one of the last `n` candles closed above its open
pub fn continuous_green(symbols: &[String], candles: &CandleSet, n: usize) -> SectionResult {
    const NAME: &str = "continuous_green";
    require_window(NAME, n)?;

    Ok(scan(NAME, symbols, candles, n, |symbol, recent| {
        require_finite(NAME, symbol, recent, "open", |c| c.open)?;
        require_finite(NAME, symbol, recent, "close", |c| c.close)?;
        Ok(recent.iter().all(|c| c.is_bullish()))
    }))
}

/// Every one of the last `n` candles closed below its open
pub fn continuous_red(symbols: &[String], candles: &CandleSet, n: usize) -> SectionResult {
    const NAME: &str = "continuous_red";
    require_window(NAME, n)?;

    Ok(scan(NAME, symbols, candles, n, |symbol, recent| {
        require_finite(NAME, symbol, recent, "open", |c| c.open)?;
        require_finite(NAME, symbol, recent, "close", |c| c.close)?;
        Ok(recent.iter().all(|c| c.is_bearish()))
    }))
}

/// Last close above the first close of the trailing `n`-candle window
pub fn low_to_high(symbols: &[String], candles: &CandleSet, n: usize) -> SectionResult {
    const NAME: &str = "low_to_high";
    require_window(NAME, n)?;

    Ok(scan(NAME, symbols, candles, n, |symbol, recent| {
        let (first, last) = match (recent.first(), recent.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(false),
        };
        require_finite(NAME, symbol, &[*first, *last], "close", |c| c.close)?;
        Ok(last.close > first.close)
    }))
}
