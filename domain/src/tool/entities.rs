//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Capability tags carried by every tool definition.
///
/// The engine dispatches on these flags instead of on concrete tool types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ToolCapabilities {
    /// Completion of the tool may end the step (subject to `can_terminate`).
    pub terminal: bool,
    /// Completion always ends the step, regardless of `can_terminate`.
    pub terminate: bool,
    /// The tool claims the root plan's form slot and waits for the user.
    pub form_input: bool,
    /// The tool reports an error through an `errorMessage` JSON field.
    pub error_report: bool,
}

impl ToolCapabilities {
    pub fn regular() -> Self {
        Self::default()
    }

    pub fn terminal() -> Self {
        Self {
            terminal: true,
            ..Self::default()
        }
    }

    pub fn terminate() -> Self {
        Self {
            terminal: true,
            terminate: true,
            ..Self::default()
        }
    }

    pub fn form_input() -> Self {
        Self {
            form_input: true,
            ..Self::default()
        }
    }

    /// Model-invoked error report: ends the step.
    pub fn error_report() -> Self {
        Self {
            terminal: true,
            error_report: true,
            ..Self::default()
        }
    }

    /// Engine-invoked error report: records the error without ending the step.
    pub fn system_error_report() -> Self {
        Self {
            error_report: true,
            ..Self::default()
        }
    }

    /// Terminal and form tools cannot share a parallel batch.
    pub fn is_parallel_restricted(&self) -> bool {
        self.terminal || self.form_input
    }
}

/// Definition of a tool that can be offered to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "terminate")
    pub name: String,
    /// Human-readable description
    pub description: String,
    pub capabilities: ToolCapabilities,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// JSON schema type (e.g., "string", "array", "object")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        capabilities: ToolCapabilities,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            capabilities,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// JSON schema object describing the parameters, as sent to the model.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                serde_json::json!({
                    "type": param.param_type,
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// A tool call proposed by the model. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned call id
    pub call_id: String,
    pub tool_name: String,
    /// Raw argument JSON exactly as the model produced it
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw arguments into an object map.
    ///
    /// Non-object JSON is wrapped as `{"value": ...}`, blank input yields an
    /// empty map and malformed JSON is an error.
    pub fn parsed_arguments(&self) -> Result<Map<String, Value>, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&self.arguments)? {
            Value::Object(map) => Ok(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Ok(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_constructors() {
        assert!(!ToolCapabilities::regular().is_parallel_restricted());
        assert!(ToolCapabilities::terminal().is_parallel_restricted());
        assert!(ToolCapabilities::form_input().is_parallel_restricted());

        let terminate = ToolCapabilities::terminate();
        assert!(terminate.terminal && terminate.terminate);

        let report = ToolCapabilities::error_report();
        assert!(report.terminal && report.error_report);

        let system = ToolCapabilities::system_error_report();
        assert!(system.error_report && !system.terminal);
        assert!(!system.is_parallel_restricted());
    }

    #[test]
    fn test_parameters_schema() {
        let def = ToolDefinition::new("echo", "Echo text", ToolCapabilities::regular())
            .with_parameter(ToolParameter::new("text", "Text to echo", true))
            .with_parameter(ToolParameter::new("count", "Repeat", false).with_type("integer"));

        let schema = def.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["count"]["type"], "integer");
        assert_eq!(schema["required"], serde_json::json!(["text"]));
    }

    #[test]
    fn test_parsed_arguments_object() {
        let call = ToolCallRequest::new("c1", "echo", r#"{"text":"hi"}"#);
        let args = call.parsed_arguments().unwrap();
        assert_eq!(args["text"], "hi");
    }

    #[test]
    fn test_parsed_arguments_wraps_scalars() {
        let call = ToolCallRequest::new("c1", "echo", "42");
        let args = call.parsed_arguments().unwrap();
        assert_eq!(args["value"], 42);
    }

    #[test]
    fn test_parsed_arguments_blank_and_invalid() {
        assert!(ToolCallRequest::new("c", "t", "  ").parsed_arguments().unwrap().is_empty());
        assert!(ToolCallRequest::new("c", "t", "{oops").parsed_arguments().is_err());
    }
}
