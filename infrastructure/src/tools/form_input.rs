//! form_input: ask the user to fill in a form

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use taskpilot_application::{FormInputHandle, Tool};
use taskpilot_domain::{
    InputItem, ToolCapabilities, ToolContext, ToolDefinition, ToolError, ToolParameter,
    UserFormInput,
};
use tracing::debug;

pub const FORM_INPUT: &str = "form_input";

#[derive(Deserialize)]
struct FormArgs {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    inputs: Vec<InputItem>,
}

/// Opens a form on its [`FormInputHandle`]; the engine then waits for the
/// user's answer.
pub struct FormInputTool {
    definition: ToolDefinition,
    handle: FormInputHandle,
}

impl Default for FormInputTool {
    fn default() -> Self {
        Self::new()
    }
}

impl FormInputTool {
    pub fn new() -> Self {
        Self {
            definition: ToolDefinition::new(
                FORM_INPUT,
                "Ask the user for information by presenting a form. Call this alone; the step waits for the answer.",
                ToolCapabilities::form_input(),
            )
            .with_parameter(ToolParameter::new("title", "Form title", true).with_type("string"))
            .with_parameter(
                ToolParameter::new("description", "What the user is asked for", false)
                    .with_type("string"),
            )
            .with_parameter(
                ToolParameter::new(
                    "inputs",
                    "Fields as objects with name, label, type, required, placeholder, options",
                    true,
                )
                .with_type("array"),
            ),
            handle: FormInputHandle::new(),
        }
    }

    pub fn handle(&self) -> &FormInputHandle {
        &self.handle
    }
}

#[async_trait]
impl Tool for FormInputTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let FormArgs {
            title,
            description,
            inputs,
        } = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| ToolError::invalid_argument(format!("invalid form: {}", e)))?;
        if inputs.is_empty() {
            return Err(ToolError::invalid_argument("form needs at least one input"));
        }
        if let Some(item) = inputs.iter().find(|item| item.name.trim().is_empty()) {
            return Err(ToolError::invalid_argument(format!(
                "input '{}' has no name",
                item.label
            )));
        }

        debug!("Opening form '{}' with {} inputs", title, inputs.len());
        self.handle.begin(UserFormInput {
            title,
            description,
            inputs,
        });
        Ok(self.handle.describe())
    }

    fn current_state(&self) -> String {
        if self.handle.state().is_some() {
            self.handle.describe()
        } else {
            String::new()
        }
    }

    fn form_input(&self) -> Option<FormInputHandle> {
        Some(self.handle.clone())
    }

    fn cleanup(&self, plan_id: &str) {
        if self.handle.owner().as_deref() == Some(plan_id) {
            self.handle.reset();
        }
    }
}
