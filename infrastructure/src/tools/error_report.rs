//! error_report: let the model report an unrecoverable problem

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use taskpilot_application::Tool;
use taskpilot_domain::{ToolCapabilities, ToolContext, ToolDefinition, ToolError, ToolParameter};

pub const ERROR_REPORT: &str = "error_report";

/// Records the model's error description and ends the step.
///
/// Output is a JSON object `{"errorMessage": ..., "timestamp": ...}`.
pub struct ErrorReportTool {
    definition: ToolDefinition,
}

impl Default for ErrorReportTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorReportTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                ERROR_REPORT,
                "Report an error that prevents the step from being completed.",
                ToolCapabilities::error_report(),
            )
            .with_parameter(
                ToolParameter::new("errorMessage", "Description of the error", true)
                    .with_type("string"),
            ),
        }
    }
}

#[async_trait]
impl Tool for ErrorReportTool {
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
