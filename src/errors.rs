use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Upstream API returned status {status}")]
    UpstreamError { status: u16, details: Value },

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(error: reqwest::Error) -> Self {
        ProxyError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(error: serde_json::Error) -> Self {
        ProxyError::ParseError(error.to_string())
    }
}
