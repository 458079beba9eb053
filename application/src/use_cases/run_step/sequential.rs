//! Single tool execution with capability-specific handling.

use super::types::{StepError, ThinkProposal, ToolDispatchError};
use super::{INTERRUPTED_MESSAGE, StepExecutor};
use crate::form_input::FormInputHandle;
use crate::ports::llm_gateway::LlmClient;
use crate::ports::tool_registry::Tool;
use crate::use_cases::shared::check_interrupted;
use crate::use_cases::tool_helpers::{extract_error_message, tool_args_preview};
use serde_json::{Map, Value};
use taskpilot_domain::util::new_think_act_id;
use taskpilot_domain::{
    ActToolParam, AgentExecResult, AgentStep, FormInputState, Message, ThinkActRecord,
    ToolCallRequest, ToolContext, unquote_json_string,
};
use tracing::{debug, error, info, warn};

pub(crate) const FORM_STORE_TIMEOUT_MESSAGE: &str = "Failed to store form due to system timeout";
pub(crate) const INPUT_TIMEOUT_MESSAGE: &str = "Input timeout occurred.";

/// Parse call arguments, falling back to an empty map on malformed JSON.
pub(crate) fn parse_arguments(call: &ToolCallRequest) -> Map<String, Value> {
    call.parsed_arguments().unwrap_or_else(|e| {
        warn!(
            "Malformed arguments for tool {}: {} (raw: {})",
            call.tool_name, e, call.arguments
        );
        Map::new()
    })
}

impl<G: LlmClient + 'static> StepExecutor<G> {
    /// Execute the only call of an act.
    ///
    /// Dispatch failures (unknown tool, a tool returning an error, form not
    /// awaiting input) end the step as `COMPLETED` with the error text and
    /// the model's raw arguments.
    pub(super) async fn execute_single(
        &self,
        step: &mut AgentStep,
        proposal: &ThinkProposal,
        call: &ToolCallRequest,
    ) -> AgentExecResult {
        if check_interrupted(&*self.interruption, &step.root_plan_id).is_err() {
            info!("Root plan {} interrupted before tool {}", step.root_plan_id, call.tool_name);
            return AgentExecResult::interrupted(INTERRUPTED_MESSAGE);
        }

        self.progress
            .on_tool_call(&call.tool_name, &tool_args_preview(call));

        match self.dispatch_single(step, proposal, call).await {
            Ok(result) => result,
            Err(StepError::Interrupted) => AgentExecResult::interrupted(INTERRUPTED_MESSAGE),
            Err(StepError::Dispatch(e)) => self.report_tool_failure(step, proposal, call, e).await,
        }
    }

    async fn dispatch_single(
        &self,
        step: &mut AgentStep,
        proposal: &ThinkProposal,
        call: &ToolCallRequest,
    ) -> Result<AgentExecResult, StepError> {
        let tool = self
            .tools
            .resolve(&call.tool_name)
            .ok_or_else(|| ToolDispatchError::UnknownTool(call.tool_name.clone()))?;
        let capabilities = tool.capabilities();
        let args = parse_arguments(call);
        let ctx = ToolContext::new(
            &proposal.tool_call_id,
            step.plan_depth,
            &step.current_plan_id,
            &step.root_plan_id,
        )
        .derive_for_call(&call.call_id);

        debug!("Executing tool {} for step {}", call.tool_name, step.step_id);
        let output = match tool.execute(&args, &ctx).await {
            Ok(raw) => unquote_json_string(&raw),
            Err(e) => {
                warn!("Tool {} failed: {}", call.tool_name, e);
                self.progress.on_tool_result(&call.tool_name, false);
                return Err(ToolDispatchError::Execution(e).into());
            }
        };
        self.progress.on_tool_result(&call.tool_name, true);
        self.persist_exchange(step, proposal, &[(call, output.as_str())]);

        let param = ActToolParam::new(&call.tool_name, &call.arguments, &proposal.tool_call_id)
            .with_result(&output);

        if capabilities.form_input {
            self.record_results(&[param]);
            return self.await_form(step, tool.as_ref()).await;
        }

        if capabilities.error_report {
            let message = extract_error_message(&output);
            warn!("Step {} reported error: {}", step.step_id, message);
            step.set_error_message(&message);
            let record = ThinkActRecord::new(
                new_think_act_id(),
                &step.step_id,
                "Error occurred during execution",
                format!("{} called to report error", call.tool_name),
            )
            .with_error(&message)
            .with_tool_params(vec![param.clone()]);
            if let Err(e) = self.recorder.record_think_and_action(step, &record) {
                warn!("Failed to record error report: {}", e);
            }
        }

        self.record_results(&[param]);

        if capabilities.terminal && (capabilities.terminate || tool.can_terminate()) {
            info!("Tool {} completed step {}", call.tool_name, step.step_id);
            self.user_input
                .release_owned_by(&step.root_plan_id, &step.current_plan_id)
                .await;
            return Ok(AgentExecResult::completed(output));
        }

        Ok(AgentExecResult::in_progress(output))
    }

    /// Hold the form slot and wait for the user to answer.
    async fn await_form(
        &self,
        step: &AgentStep,
        tool: &dyn Tool,
    ) -> Result<AgentExecResult, StepError> {
        let handle = tool
            .form_input()
            .ok_or_else(|| ToolDispatchError::MissingFormHandle(tool.name().to_string()))?;
        let state = handle.state();
        if state != Some(FormInputState::AwaitingUserInput) {
            return Err(ToolDispatchError::FormNotAwaiting(state).into());
        }

        let root = &step.root_plan_id;
        let plan = &step.current_plan_id;
        handle.set_owner(plan);
        if let Some(form) = handle.form() {
            self.progress.on_waiting_for_input(root, &form);
        }

        if !self.user_input.acquire_form_slot(root, &handle, plan).await {
            error!("Could not store form of plan {} for root {}", plan, root);
            return Ok(AgentExecResult::completed(FORM_STORE_TIMEOUT_MESSAGE));
        }

        let state = self
            .user_input
            .wait_for_user_input(
                &handle,
                root,
                &*self.interruption,
                self.params.user_input_timeout,
            )
            .await;

        if check_interrupted(&*self.interruption, root).is_err() {
            self.user_input.release_handle(root, &handle).await;
            return Err(StepError::Interrupted);
        }

        Ok(self.finish_form(step, &handle, state).await)
    }

    async fn finish_form(
        &self,
        step: &AgentStep,
        handle: &FormInputHandle,
        state: FormInputState,
    ) -> AgentExecResult {
        let description = handle.describe();
        if state == FormInputState::InputReceived {
            info!("User input received for plan {}", step.current_plan_id);
            self.memory.append(
                &step.current_plan_id,
                Message::user(format!("User input received for form: {}", description)),
            );
            AgentExecResult::in_progress(description)
        } else {
            info!("User input timed out for plan {}", step.current_plan_id);
            self.memory.append(
                &step.current_plan_id,
                Message::user(format!("Input timeout occurred for form: {}", description)),
            );
            self.user_input
                .release_handle(&step.root_plan_id, handle)
                .await;
            AgentExecResult::in_progress(INPUT_TIMEOUT_MESSAGE)
        }
    }

    async fn report_tool_failure(
        &self,
        step: &mut AgentStep,
        proposal: &ThinkProposal,
        call: &ToolCallRequest,
        err: ToolDispatchError,
    ) -> AgentExecResult {
        let message = format!(
            "Error executing tools: {}. llm return param: {}",
            err, call.arguments
        );
        error!("Step {}: {}", step.step_id, message);

        let param = ActToolParam::new(&call.tool_name, &call.arguments, &proposal.tool_call_id)
            .with_result(&message);
        let record = ThinkActRecord::new(
            new_think_act_id(),
            &step.step_id,
            &proposal.think_input,
            &proposal.think_output,
        )
        .with_error(&message)
        .with_tool_params(vec![param.clone()]);
        if let Err(e) = self.recorder.record_think_and_action(step, &record) {
            warn!("Failed to record tool failure: {}", e);
        }
        self.record_results(&[param]);

        step.set_error_message(&message);
        self.user_input
            .release_owned_by(&step.root_plan_id, &step.current_plan_id)
            .await;
        AgentExecResult::completed(message)
    }
}
