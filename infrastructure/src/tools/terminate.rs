//! terminate: end the current step

use async_trait::async_trait;
use serde_json::{Map, Value};
use taskpilot_application::Tool;
use taskpilot_domain::{ToolCapabilities, ToolContext, ToolDefinition, ToolError, ToolParameter};

pub const TERMINATE: &str = "terminate";

const DEFAULT_MESSAGE: &str = "Step terminated";

/// Completes the step with the given message.
pub struct TerminateTool {
    definition: ToolDefinition,
}

impl Default for TerminateTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminateTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                TERMINATE,
                "Finish the current step. Call this alone once the step requirement is met.",
                ToolCapabilities::terminate(),
            )
            .with_parameter(
                ToolParameter::new("message", "Summary of what the step achieved", true)
                    .with_type("string"),
            ),
        }
    }
}

#[async_trait]
impl Tool for TerminateTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let message = args
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_MESSAGE);
        Ok(message.to_string())
    }
}
