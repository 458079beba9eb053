//! Human-in-the-loop form definitions and their lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one form request.
///
/// Once resolved (`InputReceived` or `InputTimeout`) a form never returns to
/// `AwaitingUserInput` within the same cycle; a new request starts a new
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormInputState {
    AwaitingUserInput,
    InputReceived,
    InputTimeout,
}

impl FormInputState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, FormInputState::AwaitingUserInput)
    }

    pub fn is_resolved(&self) -> bool {
        !self.is_awaiting()
    }
}

impl fmt::Display for FormInputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormInputState::AwaitingUserInput => "AWAITING_USER_INPUT",
            FormInputState::InputReceived => "INPUT_RECEIVED",
            FormInputState::InputTimeout => "INPUT_TIMEOUT",
        };
        f.write_str(s)
    }
}

/// Field type of a form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Textarea,
    Number,
    Email,
    Checkbox,
    Select,
    Radio,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Textarea => "textarea",
            InputType::Number => "number",
            InputType::Email => "email",
            InputType::Checkbox => "checkbox",
            InputType::Select => "select",
            InputType::Radio => "radio",
        }
    }
}

/// A single field of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputItem {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub input_type: InputType,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl InputItem {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            input_type: InputType::default(),
            value: None,
            required: false,
            placeholder: None,
            options: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A form the model asked the user to fill in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserFormInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<InputItem>,
}

impl UserFormInput {
    /// Fill field values by name or label; unknown keys are ignored.
    pub fn apply_values<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in values {
            if let Some(item) = self
                .inputs
                .iter_mut()
                .find(|item| item.name == key || item.label == key)
            {
                item.value = Some(value.to_string());
            }
        }
    }

    /// Required fields that still have no value.
    pub fn missing_required(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .filter(|item| item.required && item.value.as_deref().is_none_or(str::is_empty))
            .map(|item| item.name.as_str())
            .collect()
    }
}

/// Snapshot of the form a root plan is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputWaitState {
    pub plan_id: String,
    pub title: String,
    pub form_description: String,
    pub form_inputs: Vec<InputItem>,
    pub waiting: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> UserFormInput {
        UserFormInput {
            title: "Deploy".to_string(),
            description: "Confirm the target".to_string(),
            inputs: vec![
                InputItem::new("env", "Environment").required(),
                InputItem::new("note", "Note"),
            ],
        }
    }

    #[test]
    fn test_state_display_and_predicates() {
        assert_eq!(
            FormInputState::AwaitingUserInput.to_string(),
            "AWAITING_USER_INPUT"
        );
        assert!(FormInputState::InputTimeout.is_resolved());
        assert!(!FormInputState::AwaitingUserInput.is_resolved());
    }

    #[test]
    fn test_apply_values_by_name_and_label() {
        let mut form = sample_form();
        form.apply_values([("env", "prod"), ("Note", "asap"), ("other", "x")]);
        assert_eq!(form.inputs[0].value.as_deref(), Some("prod"));
        assert_eq!(form.inputs[1].value.as_deref(), Some("asap"));
    }

    #[test]
    fn test_missing_required() {
        let mut form = sample_form();
        assert_eq!(form.missing_required(), vec!["env"]);
        form.apply_values([("env", "staging")]);
        assert!(form.missing_required().is_empty());
    }

    #[test]
    fn test_input_item_deserializes_type_field() {
        let item: InputItem =
            serde_json::from_str(r#"{"name":"age","label":"Age","type":"number"}"#).unwrap();
        assert_eq!(item.input_type, InputType::Number);
        assert!(!item.required);
    }
}
