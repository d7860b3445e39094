use thiserror::Error;

/// Errors from the market-data and account endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {endpoint}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("provider returned status {status} for {endpoint}: {message}")]
    Status {
        endpoint: String,
        status: String,
        message: String,
    },

    #[error("malformed payload from {endpoint}: {reason}")]
    Payload { endpoint: String, reason: String },

    #[error("request to {endpoint} timed out after {seconds}s")]
    Timeout { endpoint: String, seconds: u64 },

    #[error("missing credentials for private endpoint {0}")]
    MissingCredentials(String),
}

/// Errors raised while evaluating a pattern detector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("{detector}: invalid parameter: {reason}")]
    InvalidParameter {
        detector: &'static str,
        reason: String,
    },

    #[error("{detector}: {symbol} has a non-numeric {field} in candle {index}")]
    InvalidCandle {
        detector: &'static str,
        symbol: String,
        field: &'static str,
        index: usize,
    },
}

/// Errors from report delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notifier rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("notifier is not configured: {0}")]
    NotConfigured(String),
}
