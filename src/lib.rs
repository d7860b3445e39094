// Core modules
pub mod api;
pub mod config;
pub mod detectors;
pub mod discovery;
pub mod error;
pub mod indicators;
pub mod models;
pub mod notify;
pub mod portfolio;
pub mod report;

// Re-export commonly used types
pub use api::{Account, BithumbClient, BithumbPrivateClient, MarketData};
pub use config::AppConfig;
pub use error::{ApiError, DetectorError, NotifyError};
pub use models::*;
pub use notify::{Notifier, StdoutNotifier, TelegramNotifier};
pub use report::{AnalysisReport, ProfileKind, ReportComposer, ReportProfile};
