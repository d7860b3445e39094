// Report profiles, signal evaluation and rendering
pub mod composer;
pub mod profile;
pub mod render;
pub mod signal;

pub use composer::{ComposerSettings, ReportComposer};
pub use profile::{IntervalSlot, ProfileKind, ReportProfile, SectionSpec};
pub use render::{AnalysisReport, ChartLinks, ReportSection};
pub use signal::{Signal, SignalContext};
