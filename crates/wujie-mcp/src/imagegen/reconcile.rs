use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use super::errors::ImageGenError;
use super::gateway::TaskGateway;
use super::status::{classify, TaskState};
use super::submit::SubmittedTask;
use crate::config::PollSettings;

/// Time limits for one reconciliation loop. Polling stops at whichever runs out first.
#[derive(Debug, Clone)]
pub struct PollBudget {
    /// `None` when the estimate is too large to place on the clock; the allowance still applies.
    deadline: Option<Instant>,
    timeout: Duration,
    remaining_allowance: Duration,
    interval: Duration,
}

impl PollBudget {
    pub fn new(expected_seconds: u64, settings: &PollSettings) -> Self {
        let timeout =
            Duration::try_from_secs_f64(expected_seconds as f64 * settings.timeout_multiplier)
                .unwrap_or(Duration::MAX);
        Self {
            deadline: Instant::now().checked_add(timeout),
            timeout,
            remaining_allowance: settings.max_poll_time,
            interval: settings.interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The limit that will end the loop, as seen before any iteration is charged.
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.min(self.remaining_allowance)
    }

    fn charge_iteration(&mut self) {
        self.remaining_allowance = self.remaining_allowance.saturating_sub(self.interval);
    }

    fn is_exhausted(&self) -> bool {
        self.remaining_allowance.is_zero()
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A task that reached the succeeded state.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTask {
    pub key: String,
    pub artifact_url: String,
    pub mini_artifact_url: Option<String>,
    pub cost: i64,
    pub seed: Option<String>,
    pub polls: u32,
}

/// Drives a submitted task to a terminal state by polling the gateway.
#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn TaskGateway>,
    settings: PollSettings,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn TaskGateway>, settings: PollSettings) -> Self {
        Self { gateway, settings }
    }

    /// Polls until the task succeeds, fails, is cancelled, or the budget runs out.
    ///
    /// Queries are strictly sequential. Unknown status codes keep the loop going.
    /// Transport errors and rejected query envelopes end the loop immediately.
    pub async fn wait_for_completion(
        &self,
        task: &SubmittedTask,
        cancel: CancellationToken,
    ) -> Result<CompletedTask, ImageGenError> {
        let key = task.key.as_str();
        let mut budget = PollBudget::new(task.expected_seconds, &self.settings);
        let reported_timeout = budget.effective_timeout();
        let mut polls = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(ImageGenError::Aborted { key: key.to_string() });
                }
                _ = sleep(budget.interval()) => {}
            }

            let state = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(ImageGenError::Aborted { key: key.to_string() });
                }
                state = query_state(self.gateway.as_ref(), key) => state?,
            };
            polls += 1;

            match state {
                TaskState::Succeeded {
                    artifact_url,
                    mini_artifact_url,
                    cost,
                    seed,
                } => {
                    tracing::info!(task_key = %key, polls, cost, "image task succeeded");
                    return Ok(CompletedTask {
                        key: key.to_string(),
                        artifact_url,
                        mini_artifact_url,
                        cost,
                        seed,
                        polls,
                    });
                }
                TaskState::Failed { reason } => {
                    tracing::warn!(task_key = %key, polls, %reason, "image task failed");
                    return Err(ImageGenError::TaskFailed {
                        key: key.to_string(),
                        reason,
                    });
                }
                TaskState::Cancelled { reason } => {
                    tracing::warn!(task_key = %key, polls, %reason, "image task cancelled");
                    return Err(ImageGenError::TaskCancelled {
                        key: key.to_string(),
                        reason,
                    });
                }
                TaskState::Unknown { code, .. } => {
                    tracing::warn!(task_key = %key, polls, code, "unmapped task status, still waiting");
                }
                ref pending => {
                    tracing::debug!(task_key = %key, polls, status = pending.label(), "task pending");
                }
            }

            budget.charge_iteration();
            if budget.is_exhausted() {
                tracing::warn!(
                    task_key = %key,
                    polls,
                    timeout_secs = reported_timeout.as_secs_f64(),
                    "gave up waiting for image task"
                );
                return Err(ImageGenError::Timeout {
                    key: key.to_string(),
                    timeout: reported_timeout,
                });
            }
        }
    }
}

/// Single query plus classification. Non-terminal and terminal states are both values here.
pub async fn query_state(gateway: &dyn TaskGateway, key: &str) -> Result<TaskState, ImageGenError> {
    let envelope = gateway.query_task(key).await?;
    if !envelope.is_success() {
        return Err(ImageGenError::QueryRejected {
            key: key.to_string(),
            message: envelope.message_or_default(),
        });
    }
    let info = envelope.data.ok_or_else(|| ImageGenError::QueryRejected {
        key: key.to_string(),
        message: "response carried no task data".to_string(),
    })?;
    Ok(classify(&info))
}
