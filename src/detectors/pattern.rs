use super::{require_finite, scan, SectionResult};
use crate::models::CandleSet;

/// Two-candle bullish engulfing.
///
/// The prior candle is bearish, the latest is bullish, and the latest body
/// covers the prior one: latest open below prior close, latest close above
/// prior open.
pub fn bullish_engulfing(symbols: &[String], candles: &CandleSet) -> SectionResult {
    const NAME: &str = "bullish_engulfing";

    Ok(scan(NAME, symbols, candles, 2, |symbol, recent| {
        require_finite(NAME, symbol, recent, "open", |c| c.open)?;
        require_finite(NAME, symbol, recent, "close", |c| c.close)?;

        let prior = &recent[0];
        let latest = &recent[1];

        Ok(prior.open > prior.close
            && latest.open < latest.close
            && latest.open < prior.close
            && latest.close > prior.open)
    }))
}
