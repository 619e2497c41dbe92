use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::ProxyError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Pacing of the run status poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl PollConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub openai_base_url: Url,
    pub upstream_timeout_secs: u64,
    pub poll: PollConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::ConfigError` when `OPENAI_API_KEY` is missing or empty, or when
    /// an optional variable is present but malformed.
    pub fn from_env() -> Result<Self, ProxyError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProxyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProxyError::ConfigError("OPENAI_API_KEY is not set".to_string()))?;

        let base_url = lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let openai_base_url = Url::parse(&base_url)
            .map_err(|e| ProxyError::ConfigError(format!("OPENAI_BASE_URL: {}", e)))?;

        Ok(Self {
            openai_api_key,
            openai_org_id: lookup("OPENAI_ORG_ID").filter(|org| !org.is_empty()),
            openai_base_url,
            upstream_timeout_secs: parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?,
            poll: PollConfig {
                poll_interval_ms: parse_or(&lookup, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
                max_attempts: parse_or(&lookup, "MAX_POLL_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ProxyError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ProxyError::ConfigError(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}
