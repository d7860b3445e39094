use crate::detectors::SectionResult;
use crate::models::ChartInterval;
use chrono::{DateTime, Utc};
use std::fmt;

/// Builds trade-page links for symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLinks {
    pub base_url: String,
    pub quote: String,
}

impl ChartLinks {
    pub fn new(base_url: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            quote: quote.into(),
        }
    }

    pub fn url(&self, symbol: &str) -> String {
        format!("{}/{}-{}", self.base_url, symbol, self.quote)
    }

    /// Markdown link labelled with the symbol
    pub fn reference(&self, symbol: &str) -> String {
        format!("[{}]({})", symbol, self.url(symbol))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub interval: ChartInterval,
    pub outcome: SectionResult,
}

/// Rendered digest of one report run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
    pub links: ChartLinks,
}

impl AnalysisReport {
    /// Section outcome by title
    pub fn section(&self, title: &str) -> Option<&SectionResult> {
        self.sections
            .iter()
            .find(|s| s.title == title)
            .map(|s| &s.outcome)
    }

    pub fn failed_sections(&self) -> usize {
        self.sections.iter().filter(|s| s.outcome.is_err()).count()
    }

    /// Text handed to the notifier.
    ///
    /// Every section is present; empty matches leave an empty line and a
    /// failed section says so instead of listing symbols.
    pub fn render(&self) -> String {
        let mut out = format!(
            "*{}* ({})\n",
            self.title,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );

        for section in &self.sections {
            out.push('\n');
            out.push_str(&format!("*{}* ({})\n", section.title, section.interval));

            match &section.outcome {
                Ok(symbols) => {
                    let refs: Vec<String> =
                        symbols.iter().map(|s| self.links.reference(s)).collect();
                    out.push_str(&refs.join(", "));
                    out.push('\n');
                }
                Err(e) => out.push_str(&format!("unavailable: {}\n", e)),
            }
        }

        out
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
