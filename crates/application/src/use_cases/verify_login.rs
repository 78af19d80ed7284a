//! Login verification for social accounts.
//!
//! The backend runs the verification on an agent and reports it as a task,
//! so the use case starts it and then polls the task until it settles.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use farmhand_domain::error::validate_id;
use farmhand_domain::{ApiRequest, Task, VerificationStarted};

use crate::client::AuthenticatedHttpClient;
use crate::error::{ClientError, ClientResult};
use crate::ports::{HttpTransport, TokenStore};
use crate::use_cases::FarmApi;

/// How often and how long to poll a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two polls.
    pub interval: Duration,
    /// Polls made before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 60,
        }
    }
}

/// Starts a login verification and waits for its task to finish.
pub struct VerifyAccountLogin<T, S> {
    api: FarmApi<T, S>,
    client: Arc<AuthenticatedHttpClient<T, S>>,
    policy: PollPolicy,
}

impl<T: HttpTransport, S: TokenStore> VerifyAccountLogin<T, S> {
    /// Creates the use case.
    #[must_use]
    pub fn new(client: Arc<AuthenticatedHttpClient<T, S>>, policy: PollPolicy) -> Self {
        Self {
            api: FarmApi::new(Arc::clone(&client)),
            client,
            policy,
        }
    }

    /// Starts the verification for `account_id` and returns the finished task.
    ///
    /// The returned task may be `Failed`; inspect its status and `error`.
    ///
    /// # Errors
    /// Returns [`ClientError::PollTimedOut`] if the task is still running
    /// after the policy's attempts, or the first request error.
    pub async fn execute(&self, account_id: &str) -> ClientResult<Task> {
        let account_id = validate_id(account_id)?;
        let request = ApiRequest::post(format!("/accounts/{account_id}/verify-login"));
        let started: VerificationStarted = self.client.send_json(request).await?;
        info!(account_id, task_id = %started.task_id, "login verification started");
        self.wait_for(&started.task_id).await
    }

    /// Polls `task_id` until it reaches a terminal status.
    ///
    /// # Errors
    /// Same as [`Self::execute`].
    pub async fn wait_for(&self, task_id: &str) -> ClientResult<Task> {
        let attempts = self.policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            let task = self.api.get_task(task_id).await?;
            if task.status.is_terminal() {
                info!(task_id, status = %task.status, attempt, "task settled");
                return Ok(task);
            }
            debug!(task_id, status = %task.status, attempt, "task still running");
            if attempt < attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }
        Err(ClientError::PollTimedOut {
            task_id: task_id.to_string(),
            attempts,
        })
    }
}
