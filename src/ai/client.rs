//! Assistants API client module
//!
//! Encapsulates every call made to the upstream thread/run/message endpoints.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use crate::core::config::AppConfig;
use crate::core::models::is_valid_path_id;
use crate::errors::ProxyError;

const OPENAI_BETA_HEADER: &str = "OpenAI-Beta";
const OPENAI_BETA_VALUE: &str = "assistants=v2";
const OPENAI_ORG_HEADER: &str = "OpenAI-Organization";

/// Upstream operations the proxy orchestrates.
///
/// Each call resolves to the upstream JSON body on a 2xx status and to
/// `ProxyError::UpstreamError` carrying the status and error body otherwise.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn create_thread(&self) -> Result<Value, ProxyError>;

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<Value, ProxyError>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Value, ProxyError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Value, ProxyError>;

    async fn list_messages(&self, thread_id: &str) -> Result<Value, ProxyError>;
}

/// reqwest-backed client for the `OpenAI` Assistants v2 endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiAssistantsClient {
    http: Client,
    base_url: Url,
}

impl OpenAiAssistantsClient {
    /// # Errors
    ///
    /// Returns an error if a header value cannot be encoded or the HTTP client fails to build.
    pub fn new(config: &AppConfig) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();

        let mut auth_value: HeaderValue = format!("Bearer {}", config.openai_api_key)
            .parse()
            .map_err(|e| ProxyError::ConfigError(format!("Invalid Authorization header: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        headers.insert(OPENAI_BETA_HEADER, HeaderValue::from_static(OPENAI_BETA_VALUE));

        if let Some(org) = &config.openai_org_id {
            let org_value = org.parse().map_err(|e| {
                ProxyError::ConfigError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert(OPENAI_ORG_HEADER, org_value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| {
                ProxyError::HttpError(format!("Failed to build OpenAI HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.openai_base_url.clone(),
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    ///
    /// Empty, `.` and `..` segments are refused since the URL path would swallow them.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ProxyError> {
        if let Some(bad) = segments.iter().find(|s| !is_valid_path_id(s)) {
            return Err(ProxyError::InvalidRequest(format!(
                "Invalid path segment: {bad:?}"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ProxyError::ConfigError(format!("Base URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json(&self, url: Url, body: Option<Value>) -> Result<Value, ProxyError> {
        debug!(%url, "POST upstream");
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };

        read_json(request.send().await?).await
    }

    async fn get_json(&self, url: Url) -> Result<Value, ProxyError> {
        debug!(%url, "GET upstream");
        read_json(self.http.get(url).send().await?).await
    }
}

/// Turns an upstream response into its JSON body, or an error for non-2xx.
async fn read_json(response: Response) -> Result<Value, ProxyError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.map_err(|e| {
            ProxyError::HttpError(format!(
                "Failed to read error response body (status {status}): {e}"
            ))
        })?;
        return Err(upstream_error(status.as_u16(), &error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ProxyError::ParseError(format!("Failed to parse upstream response: {e}")))
}

/// Classifies a non-2xx upstream body.
///
/// A JSON body becomes `UpstreamError` so its status and details can be forwarded;
/// anything else is a `ParseError`, which surfaces as an internal error.
pub(crate) fn upstream_error(status: u16, body: &str) -> ProxyError {
    match serde_json::from_str::<Value>(body) {
        Ok(details) => {
            error!(status, details = %details, "Upstream call failed");
            ProxyError::UpstreamError { status, details }
        }
        Err(e) => {
            error!(status, body, "Upstream returned a non-JSON error body");
            ProxyError::ParseError(format!(
                "Upstream error body (status {status}) is not JSON: {e}"
            ))
        }
    }
}

#[async_trait]
impl AssistantsApi for OpenAiAssistantsClient {
    async fn create_thread(&self) -> Result<Value, ProxyError> {
        let url = self.endpoint(&["threads"])?;
        self.post_json(url, None).await
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<Value, ProxyError> {
        let url = self.endpoint(&["threads", thread_id, "messages"])?;
        self.post_json(url, Some(json!({ "role": "user", "content": content })))
            .await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Value, ProxyError> {
        let url = self.endpoint(&["threads", thread_id, "runs"])?;
        self.post_json(url, Some(json!({ "assistant_id": assistant_id })))
            .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Value, ProxyError> {
        let url = self.endpoint(&["threads", thread_id, "runs", run_id])?;
        self.get_json(url).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Value, ProxyError> {
        let url = self.endpoint(&["threads", thread_id, "messages"])?;
        self.get_json(url).await
    }
}
