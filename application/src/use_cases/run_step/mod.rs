//! Step use case
//!
//! Drives one agent step through a think/act cycle:
//!
//! ```text
//! step() → think() ──(retry loop)──→ route()
//!            │                         ├─ Empty  → IN_PROGRESS "please retry"
//!            │                         ├─ Single → execute_single()
//!            │                         └─ Multi  → execute_parallel()
//!            └─ failed → ErrorEscalationHandler → FAILED
//! ```
//!
//! Interruption is checked before think, before each attempt, before act,
//! before each tool or batch and while waiting for user input; it always
//! yields `INTERRUPTED`.

mod escalation;
mod parallel;
mod router;
mod sequential;
mod think;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use escalation::{ErrorEscalationHandler, SYSTEM_ERROR_REPORT, SystemErrorReportTool};
pub use parallel::ParallelToolCoordinator;
pub use router::{ToolRoute, route};
pub use types::{StepError, ThinkOutcome, ThinkProposal, ToolDispatchError};

use crate::config::StepParams;
use crate::ports::conversation_memory::ConversationMemory;
use crate::ports::execution_recorder::{ExecutionRecorder, NoRecorder};
use crate::ports::interruption::{InterruptionOracle, NeverInterrupt};
use crate::ports::llm_gateway::LlmClient;
use crate::ports::step_progress::{NoStepProgress, StepProgressNotifier};
use crate::ports::tool_registry::ToolRegistryPort;
use crate::use_cases::shared::check_interrupted;
use crate::use_cases::user_input::UserInputWaitCoordinator;
use std::sync::Arc;
use taskpilot_domain::util::new_tool_call_id;
use taskpilot_domain::{
    ActToolParam, AgentExecResult, AgentProfile, AgentStep, Message, ToolCallRequest,
};
use tracing::{debug, info, warn};

pub(crate) const INTERRUPTED_MESSAGE: &str = "Agent execution interrupted by user";
pub(crate) const NO_ACTION_MESSAGE: &str = "Thinking complete - no action needed";
pub(crate) const EMPTY_TOOL_CALL_MESSAGE: &str = "tool call is empty , please retry";

/// Use case for executing agent steps
pub struct StepExecutor<G: LlmClient + 'static> {
    pub(super) llm: Arc<G>,
    pub(super) tools: Arc<dyn ToolRegistryPort>,
    pub(super) memory: Arc<dyn ConversationMemory>,
    pub(super) user_input: Arc<UserInputWaitCoordinator>,
    pub(super) recorder: Arc<dyn ExecutionRecorder>,
    pub(super) interruption: Arc<dyn InterruptionOracle>,
    pub(super) progress: Arc<dyn StepProgressNotifier>,
    pub(super) escalation: ErrorEscalationHandler,
    pub(super) profile: AgentProfile,
    pub(super) params: StepParams,
}

impl<G: LlmClient + 'static> StepExecutor<G> {
    pub fn new(
        llm: Arc<G>,
        tools: Arc<dyn ToolRegistryPort>,
        memory: Arc<dyn ConversationMemory>,
        user_input: Arc<UserInputWaitCoordinator>,
        profile: AgentProfile,
    ) -> Self {
        let recorder: Arc<dyn ExecutionRecorder> = Arc::new(NoRecorder);
        Self {
            llm,
            tools,
            memory,
            user_input,
            escalation: ErrorEscalationHandler::new(recorder.clone()),
            recorder,
            interruption: Arc::new(NeverInterrupt),
            progress: Arc::new(NoStepProgress),
            profile,
            params: StepParams::default(),
        }
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn ExecutionRecorder>) -> Self {
        self.escalation = ErrorEscalationHandler::new(recorder.clone());
        self.recorder = recorder;
        self
    }

    pub fn with_interruption(mut self, oracle: Arc<dyn InterruptionOracle>) -> Self {
        self.interruption = oracle;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn StepProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_params(mut self, params: StepParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &StepParams {
        &self.params
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Run one think/act cycle and report its outcome.
    pub async fn step(&self, step: &mut AgentStep) -> AgentExecResult {
        let result = self.run_cycle(step).await;
        info!(
            "Step {} (plan {}) finished: {}",
            step.step_id, step.current_plan_id, result.state
        );
        self.progress.on_step_finished(step, &result);
        result
    }

    async fn run_cycle(&self, step: &mut AgentStep) -> AgentExecResult {
        if check_interrupted(&*self.interruption, &step.root_plan_id).is_err() {
            info!("Root plan {} interrupted before think", step.root_plan_id);
            return AgentExecResult::interrupted(INTERRUPTED_MESSAGE);
        }

        let outcome = match self.think(step).await {
            Ok(outcome) => outcome,
            Err(StepError::Interrupted) => {
                return AgentExecResult::interrupted(INTERRUPTED_MESSAGE);
            }
            Err(StepError::Dispatch(e)) => {
                warn!("Unexpected dispatch error during think: {}", e);
                return AgentExecResult::failed(e.to_string());
            }
        };

        match outcome {
            ThinkOutcome::Proposed(proposal) => self.act(step, proposal).await,
            ThinkOutcome::NoAction => AgentExecResult::in_progress(NO_ACTION_MESSAGE),
            ThinkOutcome::Failed(retry) => {
                self.escalation
                    .escalate(step, &retry, &new_tool_call_id())
                    .await
            }
        }
    }

    async fn act(&self, step: &mut AgentStep, proposal: ThinkProposal) -> AgentExecResult {
        if check_interrupted(&*self.interruption, &step.root_plan_id).is_err() {
            info!("Root plan {} interrupted before act", step.root_plan_id);
            return AgentExecResult::interrupted(INTERRUPTED_MESSAGE);
        }

        match route(&proposal.calls) {
            ToolRoute::Empty => AgentExecResult::in_progress(EMPTY_TOOL_CALL_MESSAGE),
            ToolRoute::Single(call) => self.execute_single(step, &proposal, call).await,
            ToolRoute::Multi(calls) => self.execute_parallel(step, &proposal, calls).await,
        }
    }

    /// Rewrite the plan's memory with the finished exchange.
    ///
    /// Memory ends up as the prior persistable history, the assistant
    /// message carrying the calls and one tool message per call.
    pub(super) fn persist_exchange(
        &self,
        step: &AgentStep,
        proposal: &ThinkProposal,
        responses: &[(&ToolCallRequest, &str)],
    ) {
        let plan_id = &step.current_plan_id;
        self.memory.clear(plan_id);
        for message in proposal.history.iter().filter(|m| m.is_persistable()) {
            self.memory.append(plan_id, message.clone());
        }
        self.memory.append(
            plan_id,
            Message::assistant_with_tool_calls(&proposal.think_output, proposal.calls.clone()),
        );
        for (call, output) in responses {
            self.memory.append(
                plan_id,
                Message::tool_response(&call.call_id, &call.tool_name, *output),
            );
        }
        debug!(
            "Memory of plan {} rewritten with {} tool responses",
            plan_id,
            responses.len()
        );
    }

    pub(super) fn record_results(&self, params: &[ActToolParam]) {
        if let Err(e) = self.recorder.record_action_result(params) {
            warn!("Failed to record action result: {}", e);
        }
    }

    /// Release per-plan tool resources and the form slot of the step's root.
    ///
    /// A sub-plan only frees the slot when it is the current occupant.
    pub async fn clear_up(&self, step: &AgentStep) {
        let plan_id = &step.current_plan_id;
        for name in self.tools.tool_names() {
            if let Some(tool) = self.tools.resolve(&name) {
                tool.cleanup(plan_id);
            }
        }
        if step.current_plan_id == step.root_plan_id {
            self.user_input.release(&step.root_plan_id).await;
        } else {
            self.user_input
                .release_owned_by(&step.root_plan_id, plan_id)
                .await;
        }
        debug!("Cleared up plan {}", plan_id);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use std::time::Duration;
    use taskpilot_domain::{AgentState, Role};

    #[tokio::test]
    async fn test_step_interrupted_before_think() {
        let harness = Harness::new(vec![]);
        harness.interrupt();
        let mut step = harness.step();

        let result = harness.executor().step(&mut step).await;

        assert_eq!(result.state, AgentState::Interrupted);
        assert_eq!(harness.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_step_without_tool_calls_stays_in_progress() {
        let harness = Harness::new(vec![
            Scripted::text("thinking"),
            Scripted::text("still thinking"),
            Scripted::text("nothing to do"),
        ]);
        let mut step = harness.step();

        let result = harness.executor().step(&mut step).await;

        assert_eq!(result, AgentExecResult::in_progress(NO_ACTION_MESSAGE));
        assert_eq!(harness.llm.calls(), 3);
        assert!(harness.recorder.think_acts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_escalates_after_exhaustion() {
        let harness = Harness::new(vec![
            Scripted::error(GatewayError::Timeout("1".into())),
            Scripted::error(GatewayError::Timeout("2".into())),
            Scripted::error(GatewayError::Timeout("3".into())),
        ]);
        let mut step = harness.step();

        let result = harness.executor().step(&mut step).await;

        assert_eq!(result.state, AgentState::Failed);
        let error = step.error_message.clone().unwrap();
        assert!(error.contains("Latest error: [Timeout] Request timeout: 3"));
        assert!(error.contains("(Total attempts: 3)"));
        let think_acts = harness.recorder.think_acts();
        assert_eq!(think_acts.len(), 1);
        assert_eq!(think_acts[0].tool_params[0].name, SYSTEM_ERROR_REPORT);
    }

    #[tokio::test]
    async fn test_step_escalates_non_retryable_immediately() {
        let harness = Harness::new(vec![Scripted::error(GatewayError::Http {
            status: 400,
            message: "bad schema".into(),
            body: Some("{\"error\":\"schema\"}".into()),
        })]);
        let mut step = harness.step();

        let result = harness.executor().step(&mut step).await;

        assert_eq!(result.state, AgentState::Failed);
        assert_eq!(harness.llm.calls(), 1);
        assert!(
            step.error_message
                .as_deref()
                .unwrap()
                .ends_with("(Total attempts: 1). API Response: {\"error\":\"schema\"}")
        );
    }

    #[tokio::test]
    async fn test_regular_tool_keeps_step_in_progress_and_rewrites_memory() {
        let harness = Harness::new(vec![Scripted::tool_calls(
            "generating",
            &[("call-1", "echo", r#"{"text":"hi"}"#)],
        )]);
        harness
            .memory
            .append("plan-1", taskpilot_domain::Message::user("earlier question"));
        let mut step = harness.step();

        let result = harness.executor().step(&mut step).await;

        assert_eq!(result, AgentExecResult::in_progress("echo: hi"));
        let memory = harness.memory.get("plan-1");
        let roles: Vec<Role> = memory.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool]);
        assert_eq!(memory[2].content, "echo: hi");
        assert!(memory.iter().all(|m| !m.env_snapshot));
    }

    #[tokio::test]
    async fn test_terminate_completes_step() {
        let harness = Harness::new(vec![Scripted::tool_calls(
            "",
            &[("call-1", "terminate", r#"{"message":"done"}"#)],
        )]);
        let mut step = harness.step();

        let result = harness.executor().step(&mut step).await;

        assert_eq!(result.state, AgentState::Completed);
        assert_eq!(harness.recorder.results().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_up_releases_slot_and_cleans_tools() {
        let harness = Harness::new(vec![]);
        let form = harness.form.clone();
        form.begin(Default::default());
        assert!(
            harness
                .user_input
                .acquire_form_slot("plan-1", &form, "plan-1")
                .await
        );

        harness.executor().clear_up(&harness.step()).await;

        assert!(harness.user_input.wait_state("plan-1").await.is_none());
        assert_eq!(harness.tools.cleaned(), vec!["plan-1".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_up_of_sub_plan_releases_root_slot() {
        let harness = Harness::new(vec![]);
        let form = harness.form.clone();
        form.begin(Default::default());
        assert!(
            harness
                .user_input
                .acquire_form_slot("plan-1", &form, "sub-1")
                .await
        );
        let executor = harness.executor();

        let sibling = AgentStep::new("s", "sub-2", "plan-1").with_plan_depth(1);
        executor.clear_up(&sibling).await;
        assert_eq!(
            harness.user_input.awaiting_occupant("plan-1").await.as_deref(),
            Some("sub-1")
        );

        let owner = AgentStep::new("s", "sub-1", "plan-1").with_plan_depth(1);
        executor.clear_up(&owner).await;
        assert!(harness.user_input.awaiting_occupant("plan-1").await.is_none());
        assert_eq!(
            harness.tools.cleaned(),
            vec!["sub-2".to_string(), "sub-1".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleep_yields_to_interruption() {
        let harness = Harness::new(vec![
            Scripted::error(GatewayError::Connection("reset".into())),
            Scripted::text("never reached"),
        ]);
        let executor = harness
            .executor()
            .with_params(StepParams::default().with_backoff(
                Duration::from_secs(30),
                Duration::from_secs(60),
            ));
        let mut step = harness.step();

        let interrupter = harness.oracle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            interrupter.interrupt();
        });

        let started = tokio::time::Instant::now();
        let result = executor.step(&mut step).await;

        assert_eq!(result.state, AgentState::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(30));
        assert_eq!(harness.llm.calls(), 1);
    }
}
