//! Upstream Assistants API access

pub mod client;
pub mod poll;

// Re-export main types for convenience
pub use client::{AssistantsApi, OpenAiAssistantsClient};
pub use poll::{RunOutcome, wait_for_run};
