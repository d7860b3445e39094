use crate::detectors::{
    bullish_engulfing, continuous_fall, continuous_green, continuous_red, continuous_rise,
    golden_cross, low_to_high, volume_spike, GoldenCrossParams, SectionResult, VolumeBaseline,
};
use crate::discovery::{common_symbols, exclude, intersect, RankBase};
use crate::models::CandleSet;

/// One report signal: a detector, a ranking overlap, or a combination
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Symbols in both the value and the return ranking
    CommonRanked(RankBase),
    Rising(usize),
    Falling(usize),
    Green(usize),
    Red(usize),
    LowToHigh(usize),
    BullishEngulfing,
    VolumeSpike {
        factor: f64,
        baseline: VolumeBaseline,
    },
    GoldenCross(GoldenCrossParams),
    /// Left result filtered to members of the right result
    Both(Box<Signal>, Box<Signal>),
    /// Left result without members of the right result
    Excluding(Box<Signal>, Box<Signal>),
}

impl Signal {
    pub fn both(left: Signal, right: Signal) -> Self {
        Signal::Both(Box::new(left), Box::new(right))
    }

    pub fn excluding(left: Signal, right: Signal) -> Self {
        Signal::Excluding(Box::new(left), Box::new(right))
    }

    /// Evaluate against a universe and its candles.
    ///
    /// A failed operand fails the combined signal.
    pub fn evaluate(&self, ctx: &SignalContext<'_>) -> SectionResult {
        let universe = ctx.by_value;
        let candles = ctx.candles;

        match self {
            Signal::CommonRanked(base) => Ok(common_symbols(ctx.by_value, ctx.by_return, *base)),
            Signal::Rising(n) => continuous_rise(universe, candles, *n),
            Signal::Falling(n) => continuous_fall(universe, candles, *n),
            Signal::Green(n) => continuous_green(universe, candles, *n),
            Signal::Red(n) => continuous_red(universe, candles, *n),
            Signal::LowToHigh(n) => low_to_high(universe, candles, *n),
            Signal::BullishEngulfing => bullish_engulfing(universe, candles),
            Signal::VolumeSpike { factor, baseline } => {
                volume_spike(universe, candles, *factor, *baseline)
            }
            Signal::GoldenCross(params) => golden_cross(universe, candles, *params),
            Signal::Both(left, right) => {
                let left = left.evaluate(ctx)?;
                let right = right.evaluate(ctx)?;
                Ok(intersect(&left, &right))
            }
            Signal::Excluding(left, right) => {
                let left = left.evaluate(ctx)?;
                let right = right.evaluate(ctx)?;
                Ok(exclude(&left, &right))
            }
        }
    }
}

/// Inputs a signal is evaluated over
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    /// Value-ranked universe; detectors run over it in this order
    pub by_value: &'a [String],
    pub by_return: &'a [String],
    pub candles: &'a CandleSet,
}
