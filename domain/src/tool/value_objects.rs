//! Tool domain value objects: execution errors and per-call results.
//!
//! Tool failures never escape as errors into the engine's control flow. They
//! are folded into a [`ToolCallResult`] whose text is handed back to the model.

use serde::{Deserialize, Serialize};

/// Error raised by a tool implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "INVALID_ARGUMENT", "EXECUTION_FAILED")
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", format!("Tool not found: {}", resource.into()))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// Outcome of one tool call inside an act phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_name: String,
    /// Call id this result answers, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub raw_output: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ToolCallResult {
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            call_id: None,
            raw_output: output.into(),
            success: true,
            error_detail: None,
        }
    }

    /// A failed call; the output handed to the model is `Error: <detail>`.
    pub fn failure(tool_name: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            tool_name: tool_name.into(),
            call_id: None,
            raw_output: format!("Error: {}", detail),
            success: false,
            error_detail: Some(detail),
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    pub fn from_tool_error(tool_name: impl Into<String>, error: &ToolError) -> Self {
        Self::failure(tool_name, error.to_string())
    }
}
