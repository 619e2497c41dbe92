//! Assistant Proxy - a Lambda that fronts the `OpenAI` Assistants API for browser clients.
//!
//! The browser never sees the API key. It sends a small JSON command and the proxy
//! orchestrates the upstream calls:
//! 1. `createThread` creates a conversation thread and returns it as-is
//! 2. `sendMessage` posts a user message, starts a run, polls the run until it
//!    settles and returns the assistant's latest reply as `{ "response": ... }`
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda behind API Gateway for serverless execution
//! - reqwest for the upstream Assistants v2 REST calls
//! - Tokio timers for the fixed-interval run status poll
//! - tracing with JSON output for `CloudWatch` Logs
//!
//! # Example
//!
//! ```no_run
//! use assistant_proxy::ai::OpenAiAssistantsClient;
//! use assistant_proxy::api::handle_request;
//! use assistant_proxy::core::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     assistant_proxy::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let client = OpenAiAssistantsClient::new(&config)?;
//!
//!     let event = serde_json::json!({
//!         "requestContext": { "http": { "method": "POST" } },
//!         "body": r#"{"action":"createThread"}"#
//!     });
//!     let response = handle_request(&client, &config.poll, &event).await;
//!     println!("{}", response["body"]);
//!
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;

pub use errors::ProxyError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This function sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. It should be called once at cold start.
///
/// # Example
///
/// ```
/// assistant_proxy::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
