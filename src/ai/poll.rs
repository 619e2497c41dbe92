//! Run status polling
//!
//! Waits for an upstream run to leave `queued`/`in_progress`, re-fetching its
//! status at a fixed interval for a bounded number of attempts.

use serde_json::Value;
use tracing::{error, info};

use super::client::AssistantsApi;
use crate::core::config::PollConfig;
use crate::core::models::{RunSnapshot, RunStatus};
use crate::errors::ProxyError;

/// How a poll loop ended.
#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    /// The run reached `failed`, `cancelled` or `expired`.
    Failed { status: RunStatus, details: Value },
    /// Attempts ran out, or the run started in a non-pending state other than `completed`.
    TimedOut { last_status: RunStatus },
    /// A status fetch failed; upstream details are not forwarded to the caller.
    StatusCheckFailed(ProxyError),
}

/// Polls `run` until it completes, fails, or `poll.max_attempts` fetches have been made.
///
/// Every attempt sleeps for `poll.interval()` before fetching. Transitions are only ever
/// taken from upstream responses.
#[tracing::instrument(level = "info", skip(api, run, poll), fields(run_id = %run.id))]
pub async fn wait_for_run(
    api: &dyn AssistantsApi,
    thread_id: &str,
    run: &RunSnapshot,
    poll: &PollConfig,
) -> RunOutcome {
    let mut status = run.status.clone();
    let mut attempts: u32 = 0;

    while status.is_pending() && attempts < poll.max_attempts {
        tokio::time::sleep(poll.interval()).await;
        attempts += 1;

        let snapshot = match api
            .retrieve_run(thread_id, &run.id)
            .await
            .and_then(RunSnapshot::try_from)
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to check run status: {}", e);
                return RunOutcome::StatusCheckFailed(e);
            }
        };

        status = snapshot.status;
        info!(
            attempt = attempts,
            max_attempts = poll.max_attempts,
            status = %status,
            "Run status"
        );

        if status.is_failure() {
            error!(status = %status, payload = %snapshot.payload, "Run failed");
            return RunOutcome::Failed {
                status,
                details: snapshot.payload,
            };
        }
    }

    if status == RunStatus::Completed {
        RunOutcome::Completed
    } else {
        error!(status = %status, attempts, "Run did not complete in time");
        RunOutcome::TimedOut {
            last_status: status,
        }
    }
}
