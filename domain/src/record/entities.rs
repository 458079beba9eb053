//! Audit records emitted by the step engine.

use serde::{Deserialize, Serialize};

/// One tool invocation as it appears in execution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActToolParam {
    pub name: String,
    /// Raw argument JSON
    pub parameters: String,
    pub tool_call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ActToolParam {
    pub fn new(
        name: impl Into<String>,
        parameters: impl Into<String>,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.into(),
            tool_call_id: tool_call_id.into(),
            result: None,
        }
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }
}

/// A think/act pair: what the model was asked, what it answered, which
/// tools it chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkActRecord {
    pub think_act_id: String,
    pub step_id: String,
    pub think_input: String,
    pub think_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub tool_params: Vec<ActToolParam>,
}

impl ThinkActRecord {
    pub fn new(
        think_act_id: impl Into<String>,
        step_id: impl Into<String>,
        think_input: impl Into<String>,
        think_output: impl Into<String>,
    ) -> Self {
        Self {
            think_act_id: think_act_id.into(),
            step_id: step_id.into(),
            think_input: think_input.into(),
            think_output: think_output.into(),
            error_message: None,
            tool_params: Vec::new(),
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_tool_params(mut self, params: Vec<ActToolParam>) -> Self {
        self.tool_params = params;
        self
    }
}
