//! Step engine parameters.
//!
//! [`StepParams`] groups the retry, wait and loop constants used by
//! [`StepExecutor`](crate::use_cases::run_step::StepExecutor) and
//! [`RunAgentUseCase`](crate::use_cases::run_agent::RunAgentUseCase).
//! Defaults are the documented contract values.

use std::time::Duration;
use taskpilot_domain::RetryPolicy;

/// Engine control parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepParams {
    /// Attempts per think phase.
    pub max_think_retries: u32,
    /// Backoff before the second attempt; doubles afterwards.
    pub backoff_base: Duration,
    /// Upper bound for a single backoff sleep.
    pub backoff_max: Duration,
    /// How long to wait for the form-slot mutex.
    pub form_lock_timeout: Duration,
    /// Poll interval while waiting for another requester's form to resolve.
    pub slot_poll_interval: Duration,
    /// Longest wait for a slot occupant before it is forced to time out.
    pub slot_wait_ceiling: Duration,
    /// Poll interval while waiting for user input.
    pub input_poll_interval: Duration,
    /// How often the interruption oracle is consulted during input waits.
    pub interruption_check_interval: Duration,
    /// Wall-clock limit for the user to answer a form.
    pub user_input_timeout: Duration,
    /// Step invocations per agent run before giving up.
    pub max_steps: usize,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            max_think_retries: 3,
            backoff_base: Duration::from_millis(2000),
            backoff_max: Duration::from_millis(60000),
            form_lock_timeout: Duration::from_secs(5),
            slot_poll_interval: Duration::from_millis(100),
            slot_wait_ceiling: Duration::from_secs(300),
            input_poll_interval: Duration::from_millis(500),
            interruption_check_interval: Duration::from_secs(2),
            user_input_timeout: Duration::from_secs(300),
            max_steps: 20,
        }
    }
}

impl StepParams {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_think_retries, self.backoff_base, self.backoff_max)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_think_retries(mut self, retries: u32) -> Self {
        self.max_think_retries = retries;
        self
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_max = max;
        self
    }

    pub fn with_form_lock_timeout(mut self, timeout: Duration) -> Self {
        self.form_lock_timeout = timeout;
        self
    }

    pub fn with_slot_wait(mut self, poll: Duration, ceiling: Duration) -> Self {
        self.slot_poll_interval = poll;
        self.slot_wait_ceiling = ceiling;
        self
    }

    pub fn with_input_polling(mut self, poll: Duration, interruption_check: Duration) -> Self {
        self.input_poll_interval = poll;
        self.interruption_check_interval = interruption_check;
        self
    }

    pub fn with_user_input_timeout(mut self, timeout: Duration) -> Self {
        self.user_input_timeout = timeout;
        self
    }

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }
}
