//! Execution recorder that emits records as tracing events.

use taskpilot_application::{ExecutionRecorder, RecorderError};
use taskpilot_domain::{ActToolParam, AgentStep, ThinkActRecord, preview};
use tracing::info;

/// Logs every record at `info` under the `taskpilot::record` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl ExecutionRecorder for TracingRecorder {
    fn record_think_and_action(
        &self,
        step: &AgentStep,
        record: &ThinkActRecord,
    ) -> Result<(), RecorderError> {
        let tools: Vec<&str> = record.tool_params.iter().map(|p| p.name.as_str()).collect();
        info!(
            target: "taskpilot::record",
            step_id = %step.step_id,
            plan_id = %step.current_plan_id,
            think_act_id = %record.think_act_id,
            error = record.error_message.as_deref().unwrap_or(""),
            "think/act: {} -> {:?}",
            preview(&record.think_output, 80),
            tools
        );
        Ok(())
    }

    fn record_action_result(&self, params: &[ActToolParam]) -> Result<(), RecorderError> {
        for param in params {
            info!(
                target: "taskpilot::record",
                tool = %param.name,
                tool_call_id = %param.tool_call_id,
                "action result: {}",
                preview(param.result.as_deref().unwrap_or(""), 120)
            );
        }
        Ok(())
    }
}
