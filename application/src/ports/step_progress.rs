//! Step execution progress port.
//!
//! [`StepProgressNotifier`] is an **output port** that the presentation layer
//! implements to display real-time step progress to the user.
//!
//! All methods have default no-op implementations, so implementers only
//! need to override the callbacks they care about.

use std::time::Duration;
use taskpilot_domain::{AgentExecResult, AgentStep, UserFormInput};

pub trait StepProgressNotifier: Send + Sync {
    /// Called before each think attempt
    fn on_think_start(&self, _step: &AgentStep, _attempt: u32) {}

    /// Called for each text chunk received during LLM streaming
    fn on_llm_chunk(&self, _chunk: &str) {}

    /// Called when a failed attempt will be retried after `delay`
    fn on_retry_scheduled(&self, _attempt: u32, _delay: Duration, _error: &str) {}

    /// Called when a think attempt succeeds after earlier failures
    fn on_retry_succeeded(&self, _plan_id: &str, _attempt: u32) {}

    /// Called when a tool is invoked
    fn on_tool_call(&self, _tool_name: &str, _args: &str) {}

    /// Called when a tool returns a result
    fn on_tool_result(&self, _tool_name: &str, _success: bool) {}

    /// Called when a form is waiting for the user
    fn on_waiting_for_input(&self, _root_plan_id: &str, _form: &UserFormInput) {}

    /// Called after every step invocation
    fn on_step_finished(&self, _step: &AgentStep, _result: &AgentExecResult) {}
}

/// No-op implementation for tests and when progress display is disabled.
pub struct NoStepProgress;

impl StepProgressNotifier for NoStepProgress {}
