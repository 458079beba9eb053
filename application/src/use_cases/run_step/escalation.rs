//! Escalation of an unreachable model into a FAILED step.
//!
//! When the think phase gives up, the engine calls the system error report
//! tool on the model's behalf so the failure travels the same recording
//! path as any other tool call.

use crate::ports::execution_recorder::ExecutionRecorder;
use crate::ports::tool_registry::Tool;
use crate::use_cases::tool_helpers::extract_error_message;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use taskpilot_domain::util::new_think_act_id;
use taskpilot_domain::{
    ActToolParam, AgentExecResult, AgentStep, RetryContext, ThinkActRecord, ToolCapabilities,
    ToolContext, ToolDefinition, ToolError, ToolParameter,
};
use tracing::{error, warn};

pub const SYSTEM_ERROR_REPORT: &str = "system_error_report";

/// Engine-owned tool that turns an error message into a timestamped report.
pub struct SystemErrorReportTool {
    definition: ToolDefinition,
}

impl Default for SystemErrorReportTool {
    fn default() -> Self {
        Self {
            definition: ToolDefinition::new(
                SYSTEM_ERROR_REPORT,
                "Report a system-level failure that prevented the agent from continuing",
                ToolCapabilities::system_error_report(),
            )
            .with_parameter(ToolParameter::new(
                "errorMessage",
                "Detailed description of the failure",
                true,
            )),
        }
    }
}

#[async_trait]
impl Tool for SystemErrorReportTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let message = args
            .get("errorMessage")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::invalid_argument("errorMessage is required"))?;
        Ok(json!({
            "errorMessage": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })
        .to_string())
    }
}

/// Turns an exhausted retry context into a recorded FAILED result.
pub struct ErrorEscalationHandler {
    recorder: Arc<dyn ExecutionRecorder>,
    tool: SystemErrorReportTool,
}

impl ErrorEscalationHandler {
    pub fn new(recorder: Arc<dyn ExecutionRecorder>) -> Self {
        Self {
            recorder,
            tool: SystemErrorReportTool::default(),
        }
    }

    /// Diagnostic text for the latest failure in `retry`.
    pub fn diagnostic(retry: &RetryContext) -> String {
        let Some(latest) = retry.latest() else {
            return format!(
                "LLM call failed after all retry attempts. (Total attempts: {})",
                retry.len()
            );
        };
        let mut message = format!(
            "LLM call failed after all retry attempts. Latest error: [{}] {} (Total attempts: {})",
            latest.kind,
            latest.message,
            retry.len()
        );
        if let Some(body) = &latest.response_body {
            message.push_str(&format!(". API Response: {}", body));
        }
        message
    }

    pub async fn escalate(
        &self,
        step: &mut AgentStep,
        retry: &RetryContext,
        tool_call_id: &str,
    ) -> AgentExecResult {
        let message = Self::diagnostic(retry);
        error!("Step {} escalated: {}", step.step_id, message);

        let arguments = json!({ "errorMessage": message });
        let mut args = Map::new();
        args.insert("errorMessage".to_string(), Value::String(message.clone()));
        let ctx = ToolContext::new(
            tool_call_id,
            step.plan_depth,
            &step.current_plan_id,
            &step.root_plan_id,
        );

        let output = match self.tool.execute(&args, &ctx).await {
            Ok(output) => output,
            Err(e) => {
                warn!("System error report tool failed: {}", e);
                message.clone()
            }
        };

        let param = ActToolParam::new(SYSTEM_ERROR_REPORT, arguments.to_string(), tool_call_id)
            .with_result(&output);
        if let Err(e) = self
            .recorder
            .record_action_result(std::slice::from_ref(&param))
        {
            warn!("Failed to record escalation result: {}", e);
        }

        let record = ThinkActRecord::new(
            new_think_act_id(),
            &step.step_id,
            format!("LLM call failed after {} attempts", retry.len()),
            "SystemErrorReportTool called to report LLM failure",
        )
        .with_error(&message)
        .with_tool_params(vec![param]);
        if let Err(e) = self.recorder.record_think_and_action(step, &record) {
            warn!("Failed to record escalation think/act: {}", e);
        }

        step.set_error_message(extract_error_message(&output));
        AgentExecResult::failed(output)
    }
}
