//! Static description of the agent driving a step.

use serde::{Deserialize, Serialize};

/// Who the agent is and which tools it may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub description: String,
    /// Instruction appended to every think prompt.
    pub next_step_prompt: String,
    pub available_tools: Vec<String>,
    /// Model override; `None` uses the client's default.
    #[serde(default)]
    pub model: Option<String>,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            next_step_prompt: String::new(),
            available_tools: Vec::new(),
            model: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_next_step_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.next_step_prompt = prompt.into();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self::new("default-agent")
            .with_description("General purpose agent that completes plan steps with tools")
            .with_next_step_prompt(
                "Decide the next action for the current step. Call terminate when the step is done.",
            )
    }
}
