//! Application configuration
//!
//! Layered: built-in defaults, `config/default.toml` (optional), an explicit
//! file (optional), then `COINSIGNAL__SECTION__KEY` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const ENV_PREFIX: &str = "COINSIGNAL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub credentials: Credentials,
    pub telegram: TelegramConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub quote_currency: String,
    pub request_timeout_secs: u64,
    pub requests_per_second: u32,
    /// Candle requests in flight at once; 1 keeps fetching sequential
    pub max_concurrent_requests: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bithumb.com".to_string(),
            quote_currency: "KRW".to_string(),
            request_timeout_secs: 10,
            requests_per_second: 10,
            max_concurrent_requests: 1,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

/// Private API key pair. Only the portfolio path needs it.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl Credentials {
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some((key, secret))
            }
            _ => None,
        }
    }
}

// Keep secrets out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: None,
            chat_id: None,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "***"))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub universe_size: usize,
    /// Trade page prefix; `{SYMBOL}-{QUOTE}` is appended
    pub chart_base_url: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            universe_size: crate::discovery::DEFAULT_UNIVERSE_SIZE,
            chart_base_url: "https://www.bithumb.com/react/trade/order".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, optionally from an explicit file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::with_name("config/default").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
