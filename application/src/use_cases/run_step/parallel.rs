//! Parallel tool execution for multi-call acts.
//!
//! Every call of a batch runs concurrently on a [`JoinSet`]. Results are
//! matched back to calls by call id (by tool name only for results that carry
//! no id), so the output sequence follows the model's proposal no matter which
//! call finished first.

use super::sequential::parse_arguments;
use super::types::ThinkProposal;
use super::{INTERRUPTED_MESSAGE, StepExecutor};
use crate::ports::llm_gateway::LlmClient;
use crate::ports::tool_registry::ToolRegistryPort;
use crate::use_cases::shared::check_interrupted;
use crate::use_cases::tool_helpers::tool_args_preview;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use taskpilot_domain::{
    ActToolParam, AgentExecResult, AgentStep, ToolCallRequest, ToolCallResult, ToolContext,
    ToolError, unquote_json_string,
};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

pub(crate) const RESULT_NOT_FOUND: &str = "Tool execution result not found";

/// Runs a batch of tool calls concurrently.
pub struct ParallelToolCoordinator {
    tools: Arc<dyn ToolRegistryPort>,
}

impl ParallelToolCoordinator {
    pub fn new(tools: Arc<dyn ToolRegistryPort>) -> Self {
        Self { tools }
    }

    /// Names of calls that may not share a batch (terminal or form tools).
    pub fn restricted_tools(&self, calls: &[ToolCallRequest]) -> Vec<String> {
        calls
            .iter()
            .filter(|call| {
                self.tools
                    .resolve(&call.tool_name)
                    .is_some_and(|tool| tool.capabilities().is_parallel_restricted())
            })
            .map(|call| call.tool_name.clone())
            .collect()
    }

    /// Execute every call and return one result per call, in call order.
    ///
    /// A call whose task panicked or vanished gets a placeholder failure.
    pub async fn execute_many(
        &self,
        calls: &[ToolCallRequest],
        parent: &ToolContext,
    ) -> Vec<ToolCallResult> {
        let mut set = JoinSet::new();
        for call in calls {
            let tools = self.tools.clone();
            let call = call.clone();
            let ctx = parent.derive_for_call(&call.call_id);
            set.spawn(async move {
                let name = call.tool_name.clone();
                let outcome = AssertUnwindSafe(run_call(tools, call, ctx))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(result) => Some(result),
                    Err(_) => {
                        error!("Tool {} panicked during parallel execution", name);
                        None
                    }
                }
            });
        }

        let mut completed: Vec<ToolCallResult> = Vec::with_capacity(calls.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some(result)) => {
                    debug!("Parallel tool {} finished", result.tool_name);
                    completed.push(result);
                }
                Ok(None) => {}
                Err(e) => error!("Parallel tool task failed: {}", e),
            }
        }

        calls
            .iter()
            .map(|call| {
                let position = completed
                    .iter()
                    .position(|result| result.call_id.as_deref() == Some(call.call_id.as_str()))
                    .or_else(|| {
                        completed.iter().position(|result| {
                            result.call_id.is_none() && result.tool_name == call.tool_name
                        })
                    });
                match position {
                    Some(index) => completed.remove(index),
                    None => {
                        warn!("No result for parallel tool {}", call.tool_name);
                        ToolCallResult {
                            tool_name: call.tool_name.clone(),
                            call_id: Some(call.call_id.clone()),
                            raw_output: RESULT_NOT_FOUND.to_string(),
                            success: false,
                            error_detail: Some(RESULT_NOT_FOUND.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}

async fn run_call(
    tools: Arc<dyn ToolRegistryPort>,
    call: ToolCallRequest,
    ctx: ToolContext,
) -> ToolCallResult {
    let Some(tool) = tools.resolve(&call.tool_name) else {
        return ToolCallResult::from_tool_error(
            &call.tool_name,
            &ToolError::not_found(&call.tool_name),
        )
        .with_call_id(&call.call_id);
    };
    let args = parse_arguments(&call);
    match tool.execute(&args, &ctx).await {
        Ok(raw) => ToolCallResult::success(&call.tool_name, unquote_json_string(&raw)),
        Err(e) => {
            warn!("Tool {} failed: {}", call.tool_name, e);
            ToolCallResult::from_tool_error(&call.tool_name, &e)
        }
    }
    .with_call_id(&call.call_id)
}

impl<G: LlmClient + 'static> StepExecutor<G> {
    /// Execute a multi-call act. The step never completes here.
    pub(super) async fn execute_parallel(
        &self,
        step: &AgentStep,
        proposal: &ThinkProposal,
        calls: &[ToolCallRequest],
    ) -> AgentExecResult {
        if check_interrupted(&*self.interruption, &step.root_plan_id).is_err() {
            info!("Root plan {} interrupted before tool batch", step.root_plan_id);
            return AgentExecResult::interrupted(INTERRUPTED_MESSAGE);
        }

        let coordinator = ParallelToolCoordinator::new(self.tools.clone());
        let restricted = coordinator.restricted_tools(calls);
        if !restricted.is_empty() {
            warn!(
                "Rejected batch of {} calls for step {}: restricted tools {:?}",
                calls.len(),
                step.step_id,
                restricted
            );
            return AgentExecResult::in_progress(format!(
                "Multiple tools execution does not support TerminableTool and FormInputTool. \
                 Found restricted tools: {}. Please retry by calling tools separately, or use other tools.",
                restricted.join(", ")
            ));
        }

        for call in calls {
            self.progress
                .on_tool_call(&call.tool_name, &tool_args_preview(call));
        }

        let parent = ToolContext::new(
            &proposal.tool_call_id,
            step.plan_depth,
            &step.current_plan_id,
            &step.root_plan_id,
        );
        let results = coordinator.execute_many(calls, &parent).await;

        let not_found = results
            .iter()
            .filter(|r| r.raw_output == RESULT_NOT_FOUND)
            .count();
        if not_found > 1 {
            warn!(
                "{} of {} parallel results missing for step {}",
                not_found,
                results.len(),
                step.step_id
            );
        }

        for result in &results {
            self.progress.on_tool_result(&result.tool_name, result.success);
        }

        let responses: Vec<(&ToolCallRequest, &str)> = calls
            .iter()
            .zip(&results)
            .map(|(call, result)| (call, result.raw_output.as_str()))
            .collect();
        self.persist_exchange(step, proposal, &responses);

        let params: Vec<ActToolParam> = calls
            .iter()
            .zip(&results)
            .map(|(call, result)| {
                ActToolParam::new(&call.tool_name, &call.arguments, &proposal.tool_call_id)
                    .with_result(&result.raw_output)
            })
            .collect();
        self.record_results(&params);

        let outputs: Vec<&str> = results.iter().map(|r| r.raw_output.as_str()).collect();
        AgentExecResult::in_progress(format!("[{}]", outputs.join(", ")))
    }
}
