/// Drives one vendor job to a terminal state
///
/// Repeatedly queries the adapter with a growing interval, reporting every
/// tick through the progress callback. A single invocation owns exactly one
/// job and runs serially; nothing here parallelizes.
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use tasks::TaskStatus;

use crate::vendors::{VendorAdapter, VendorError};

pub const TIMEOUT_MESSAGE: &str = "task timed out";
pub const CANCELLED_MESSAGE: &str = "generation cancelled";
const GENERIC_FAILURE_MESSAGE: &str = "generation failed";

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Initial delay between queries.
    pub interval: Duration,
    /// Attempt budget before the job is reported as timed out.
    pub max_attempts: u32,
    /// Interval growth factor applied after each non-terminal query.
    pub backoff_multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 180,
            backoff_multiplier: 1.1,
        }
    }
}

/// Final result of a poll run.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub status: TaskStatus,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub error_message: Option<String>,
    pub progress: f32,
    pub duration_secs: Option<u32>,
}

impl PollOutcome {
    fn failed(message: String, progress: f32) -> Self {
        Self {
            status: TaskStatus::Failed,
            video_url: None,
            thumbnail_url: None,
            error_message: Some(message),
            progress,
            duration_secs: None,
        }
    }
}

/// Poll `task_id` until it completes, fails, times out, or is cancelled.
///
/// `on_progress` fires on every successful query, terminal or not. Progress
/// prefers the vendor-reported figure and otherwise derives a linear
/// estimate from the attempt count; per job it never goes backwards.
///
/// Query errors are transient while attempts remain: the loop sleeps at the
/// current interval and tries again without touching the backoff state. The
/// last allowed attempt propagates the error instead.
pub async fn poll_task(
    adapter: &dyn VendorAdapter,
    task_id: &str,
    sub_model: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_progress: impl FnMut(TaskStatus, f32),
) -> Result<PollOutcome, VendorError> {
    let mut attempts: u32 = 0;
    let mut interval = config.interval;
    let mut last_progress: f32 = 0.0;

    while attempts < config.max_attempts {
        if cancel.is_cancelled() {
            return Ok(PollOutcome::failed(CANCELLED_MESSAGE.to_string(), last_progress));
        }

        match adapter.query(task_id, sub_model).await {
            Ok(snapshot) => {
                let synthetic = attempts as f32 / config.max_attempts as f32 * 100.0;
                let progress = snapshot.progress.unwrap_or(synthetic).max(last_progress);
                last_progress = progress;
                on_progress(snapshot.status, progress);

                match snapshot.status {
                    TaskStatus::Completed => {
                        tracing::info!(target: "poller", "task {task_id} completed after {attempts} attempt(s)");
                        return Ok(PollOutcome {
                            status: TaskStatus::Completed,
                            video_url: snapshot.video_url,
                            thumbnail_url: snapshot.thumbnail_url,
                            error_message: None,
                            progress: 100.0,
                            duration_secs: snapshot.duration_secs,
                        });
                    }
                    TaskStatus::Failed => {
                        let message = snapshot
                            .error_message
                            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                        tracing::warn!(target: "poller", "task {task_id} failed: {message}");
                        return Ok(PollOutcome::failed(message, progress));
                    }
                    TaskStatus::Pending | TaskStatus::Processing => {
                        if sleep_or_cancelled(interval, cancel).await {
                            return Ok(PollOutcome::failed(
                                CANCELLED_MESSAGE.to_string(),
                                last_progress,
                            ));
                        }
                        interval = interval.mul_f64(config.backoff_multiplier);
                        attempts += 1;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(target: "poller", "query error for task {task_id}: {err}");
                if attempts + 1 >= config.max_attempts {
                    return Err(err);
                }
                if sleep_or_cancelled(interval, cancel).await {
                    return Ok(PollOutcome::failed(
                        CANCELLED_MESSAGE.to_string(),
                        last_progress,
                    ));
                }
                attempts += 1;
            }
        }
    }

    tracing::warn!(target: "poller", "task {task_id} exhausted {} attempts", config.max_attempts);
    Ok(PollOutcome::failed(TIMEOUT_MESSAGE.to_string(), last_progress))
}

/// True when the token fired before the sleep elapsed.
async fn sleep_or_cancelled(interval: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(interval) => false,
    }
}
