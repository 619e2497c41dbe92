//! API Lambda handler - validates the request and dispatches on `action`.
//!
//! This module handles:
//! - CORS preflight and method filtering
//! - `createThread`: forwards thread creation upstream
//! - `sendMessage`: posts the message, starts a run, polls it and returns the reply
//!
//! Request-level failures are always turned into JSON responses; the Lambda
//! invocation itself never fails.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::{Value, json};
use tracing::{error, info};

use super::{helpers, parsing};
use crate::ai::{AssistantsApi, RunOutcome, wait_for_run};
use crate::core::config::PollConfig;
use crate::core::models::{
    Command, CommandError, RunSnapshot, SendMessage, extract_reply_text,
};
use crate::errors::ProxyError;

pub use self::function_handler as handler;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INVALID_ACTION: &str = "Invalid action";
pub const INVALID_BODY: &str = "Invalid request body";
pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_THREAD_ID: &str = "Invalid threadId";
pub const INTERNAL_ERROR: &str = "Internal server error";

pub const CREATE_THREAD_FAILED: &str = "創建線程失敗";
pub const ADD_MESSAGE_FAILED: &str = "添加訊息失敗";
pub const START_RUN_FAILED: &str = "啟動 Assistant 失敗";
pub const STATUS_CHECK_FAILED: &str = "檢查運行狀態失敗";
pub const LIST_MESSAGES_FAILED: &str = "獲取訊息失敗";

/// Lambda handler for the proxy entrypoint.
///
/// # Errors
///
/// Never returns an error; every failure is reported as an HTTP response payload.
#[tracing::instrument(level = "info", skip(api, poll, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    api: &dyn AssistantsApi,
    poll: &PollConfig,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(handle_request(api, poll, &event.payload).await)
}

/// Handles one API Gateway proxy event and builds the proxy response.
pub async fn handle_request(api: &dyn AssistantsApi, poll: &PollConfig, payload: &Value) -> Value {
    let method = parsing::request_method(payload).unwrap_or_default();
    info!(method = %method, "Proxy received request");

    if method.eq_ignore_ascii_case("OPTIONS") {
        return helpers::ok_empty();
    }

    if !method.eq_ignore_ascii_case("POST") {
        return helpers::err_response(405, METHOD_NOT_ALLOWED);
    }

    let body = match parsing::parse_command_body(payload) {
        Ok(body) => body,
        Err(e) => {
            error!("Rejecting request body: {}", e);
            return helpers::err_with_details(400, INVALID_BODY, json!(e.to_string()));
        }
    };

    let command = match Command::try_from(&body) {
        Ok(command) => command,
        Err(CommandError::InvalidAction) => return helpers::err_response(400, INVALID_ACTION),
        Err(CommandError::MissingFields(fields)) => {
            return helpers::err_with_details(400, MISSING_FIELDS, json!(fields));
        }
        Err(CommandError::InvalidThreadId) => return helpers::err_response(400, INVALID_THREAD_ID),
    };

    let result = match command {
        Command::CreateThread => create_thread(api).await,
        Command::SendMessage(send) => send_message(api, poll, &send).await,
    };

    result.unwrap_or_else(|e| {
        error!("Assistants API error: {}", e);
        helpers::err_with_details(500, INTERNAL_ERROR, json!(e.to_string()))
    })
}

/// Maps an upstream non-success into a forwarded-status response; other errors propagate.
fn forward_upstream_error(err: ProxyError, message: &str) -> Result<Value, ProxyError> {
    match err {
        ProxyError::UpstreamError { status, details } => {
            error!(status, details = %details, "{}", message);
            Ok(helpers::err_with_details(status, message, details))
        }
        other => Err(other),
    }
}

async fn create_thread(api: &dyn AssistantsApi) -> Result<Value, ProxyError> {
    info!("Creating thread");

    let thread = match api.create_thread().await {
        Ok(thread) => thread,
        Err(e) => return forward_upstream_error(e, CREATE_THREAD_FAILED),
    };

    let thread_id = thread.get("id").and_then(Value::as_str).unwrap_or_default();
    info!(thread_id, "Thread created");
    Ok(helpers::ok_json(&thread))
}

async fn send_message(
    api: &dyn AssistantsApi,
    poll: &PollConfig,
    send: &SendMessage,
) -> Result<Value, ProxyError> {
    #[cfg(feature = "debug-logs")]
    info!(thread_id = %send.thread_id, content = %send.message, "Sending message");

    #[cfg(not(feature = "debug-logs"))]
    info!(
        thread_id = %send.thread_id,
        message_chars = send.message.chars().count(),
        "Sending message"
    );

    if let Err(e) = api.add_message(&send.thread_id, &send.message).await {
        return forward_upstream_error(e, ADD_MESSAGE_FAILED);
    }

    info!(assistant_id = %send.assistant_id, "Starting run");
    let run = match api.create_run(&send.thread_id, &send.assistant_id).await {
        Ok(run) => RunSnapshot::try_from(run)?,
        Err(e) => return forward_upstream_error(e, START_RUN_FAILED),
    };
    info!(run_id = %run.id, status = %run.status, "Run started");

    match wait_for_run(api, &send.thread_id, &run, poll).await {
        RunOutcome::Completed => {}
        RunOutcome::StatusCheckFailed(_) => {
            return Ok(helpers::err_response(500, STATUS_CHECK_FAILED));
        }
        RunOutcome::Failed { status, details } => {
            return Ok(helpers::err_with_details(
                500,
                &format!("Assistant 運行失敗: {status}"),
                details,
            ));
        }
        RunOutcome::TimedOut { last_status } => {
            return Ok(helpers::err_response(
                408,
                &format!("Assistant 運行超時，狀態: {last_status}"),
            ));
        }
    }

    info!("Fetching reply");
    let messages = match api.list_messages(&send.thread_id).await {
        Ok(messages) => messages,
        Err(e @ ProxyError::UpstreamError { .. }) => {
            error!("Failed to list messages: {}", e);
            return Ok(helpers::err_response(500, LIST_MESSAGES_FAILED));
        }
        Err(e) => return Err(e),
    };

    let reply = extract_reply_text(messages)?;
    info!(reply_chars = reply.chars().count(), "Reply fetched");

    Ok(helpers::ok_json(&json!({ "response": reply })))
}
