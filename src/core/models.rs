use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::ProxyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    pub thread_id: String,
    pub message: String,
    pub assistant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateThread,
    SendMessage(SendMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    InvalidAction,
    MissingFields(Vec<&'static str>),
    InvalidThreadId,
}

/// True when `id` is usable as a single upstream path segment.
#[must_use]
pub fn is_valid_path_id(id: &str) -> bool {
    !matches!(id, "" | "." | "..")
}

/// Decodes a request body into a command.
///
/// Only `action` is inspected for `createThread`; `sendMessage` additionally needs
/// string `threadId`, `message` and `assistantId`. A body that is not a JSON object
/// carries no action.
impl TryFrom<&Value> for Command {
    type Error = CommandError;

    fn try_from(body: &Value) -> Result<Self, Self::Error> {
        let Some(fields) = body.as_object() else {
            return Err(CommandError::InvalidAction);
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str);

        match text("action") {
            Some("createThread") => Ok(Command::CreateThread),
            Some("sendMessage") => {
                let (thread_id, message, assistant_id) =
                    (text("threadId"), text("message"), text("assistantId"));

                let (Some(thread_id), Some(message), Some(assistant_id)) =
                    (thread_id, message, assistant_id)
                else {
                    let missing = [
                        ("threadId", thread_id),
                        ("message", message),
                        ("assistantId", assistant_id),
                    ]
                    .into_iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| name)
                    .collect();
                    return Err(CommandError::MissingFields(missing));
                };

                if !is_valid_path_id(thread_id) {
                    return Err(CommandError::InvalidThreadId);
                }

                Ok(Command::SendMessage(SendMessage {
                    thread_id: thread_id.to_string(),
                    message: message.to_string(),
                    assistant_id: assistant_id.to_string(),
                }))
            }
            _ => Err(CommandError::InvalidAction),
        }
    }
}

/// Lifecycle status of an upstream run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Other(String),
}

impl RunStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Other(s) => s,
        }
    }

    /// Statuses that keep the poll loop going.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }
}

impl From<&str> for RunStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "cancelled" => RunStatus::Cancelled,
            "expired" => RunStatus::Expired,
            other => RunStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run object as returned by the upstream, with the full payload kept for error details.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub id: String,
    pub status: RunStatus,
    pub payload: Value,
}

impl TryFrom<Value> for RunSnapshot {
    type Error = ProxyError;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ProxyError::ParseError("run payload has no id".to_string()))?
            .to_string();
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .map(RunStatus::from)
            .ok_or_else(|| ProxyError::ParseError("run payload has no status".to_string()))?;

        Ok(Self {
            id,
            status,
            payload,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

/// Pulls the text of the first content block of the first (most recent) message.
///
/// # Errors
///
/// Returns `ProxyError::ParseError` when the list is empty or the first block carries no text.
pub fn extract_reply_text(messages: Value) -> Result<String, ProxyError> {
    let list: MessageList = serde_json::from_value(messages)?;

    list.data
        .into_iter()
        .next()
        .ok_or_else(|| ProxyError::ParseError("thread has no messages".to_string()))?
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .map(|text| text.value)
        .ok_or_else(|| ProxyError::ParseError("latest message has no text content".to_string()))
}
