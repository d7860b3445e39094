use super::signal::Signal;
use crate::detectors::{GoldenCrossParams, VolumeBaseline};
use crate::discovery::RankBase;
use crate::models::ChartInterval;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    ShortTerm,
    LongTerm,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::ShortTerm => "short-term",
            ProfileKind::LongTerm => "long-term",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" | "short-term" => Ok(ProfileKind::ShortTerm),
            "long" | "long-term" => Ok(ProfileKind::LongTerm),
            other => Err(format!("unknown report profile '{}'", other)),
        }
    }
}

/// Which fetched candle set a section reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSlot {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub title: String,
    pub slot: IntervalSlot,
    pub signal: Signal,
}

impl SectionSpec {
    pub fn new(title: impl Into<String>, slot: IntervalSlot, signal: Signal) -> Self {
        Self {
            title: title.into(),
            slot,
            signal,
        }
    }
}

/// A report recipe: intervals to fetch and the sections to render
#[derive(Debug, Clone, PartialEq)]
pub struct ReportProfile {
    pub kind: ProfileKind,
    pub title: String,
    pub primary: ChartInterval,
    pub secondary: Option<ChartInterval>,
    pub sections: Vec<SectionSpec>,
}

impl ReportProfile {
    pub fn for_kind(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::ShortTerm => Self::short_term(),
            ProfileKind::LongTerm => Self::long_term(),
        }
    }

    /// Hourly momentum with a 30-minute crossover view
    pub fn short_term() -> Self {
        use IntervalSlot::{Primary, Secondary};

        let recent_cross = GoldenCrossParams::new(5, 20, 3);
        let wider_cross = GoldenCrossParams::new(5, 20, 10);

        Self {
            kind: ProfileKind::ShortTerm,
            title: "Short-term signals".to_string(),
            primary: ChartInterval::OneHour,
            secondary: Some(ChartInterval::ThirtyMinutes),
            sections: vec![
                SectionSpec::new(
                    "Top value ∩ top return",
                    Primary,
                    Signal::CommonRanked(RankBase::Return),
                ),
                SectionSpec::new(
                    "Rising 3 ∧ green 3",
                    Primary,
                    Signal::both(Signal::Rising(3), Signal::Green(3)),
                ),
                SectionSpec::new(
                    "Volume spike x1.5",
                    Primary,
                    Signal::VolumeSpike {
                        factor: 1.5,
                        baseline: VolumeBaseline::Ema,
                    },
                ),
                SectionSpec::new("Bullish engulfing", Primary, Signal::BullishEngulfing),
                SectionSpec::new(
                    "Golden cross 5/20, last 3 bars",
                    Secondary,
                    Signal::GoldenCross(recent_cross),
                ),
                SectionSpec::new(
                    "Golden cross 5/20, 4 to 10 bars ago",
                    Secondary,
                    Signal::excluding(
                        Signal::GoldenCross(wider_cross),
                        Signal::GoldenCross(recent_cross),
                    ),
                ),
                SectionSpec::new("Low to high over 5", Secondary, Signal::LowToHigh(5)),
            ],
        }
    }

    /// Daily trend view
    pub fn long_term() -> Self {
        use IntervalSlot::Primary;

        Self {
            kind: ProfileKind::LongTerm,
            title: "Long-term signals".to_string(),
            primary: ChartInterval::OneDay,
            secondary: None,
            sections: vec![
                SectionSpec::new(
                    "Top value ∩ top return",
                    Primary,
                    Signal::CommonRanked(RankBase::Return),
                ),
                SectionSpec::new(
                    "Rising 3 ∧ green 3",
                    Primary,
                    Signal::both(Signal::Rising(3), Signal::Green(3)),
                ),
                SectionSpec::new(
                    "Falling 3 ∧ red 3",
                    Primary,
                    Signal::both(Signal::Falling(3), Signal::Red(3)),
                ),
                SectionSpec::new(
                    "Volume spike x2",
                    Primary,
                    Signal::VolumeSpike {
                        factor: 2.0,
                        baseline: VolumeBaseline::Ema,
                    },
                ),
                SectionSpec::new(
                    "Golden cross 50/200, last 10 bars",
                    Primary,
                    Signal::GoldenCross(GoldenCrossParams::default()),
                ),
                SectionSpec::new("Low to high over 30", Primary, Signal::LowToHigh(30)),
            ],
        }
    }

    /// Interval backing `slot`; a missing secondary falls back to primary
    pub fn interval(&self, slot: IntervalSlot) -> ChartInterval {
        match slot {
            IntervalSlot::Primary => self.primary,
            IntervalSlot::Secondary => self.secondary.unwrap_or(self.primary),
        }
    }
}
