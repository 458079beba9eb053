//! Agent configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use taskpilot_domain::{AgentProfile, ConfigIssue, ConfigIssueCode};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// name = "release-bot"
/// description = "Prepares release notes"
/// next_step_prompt = "Decide the next action."
/// tools = ["terminate", "form_input"]   # empty = every registered tool
/// model = "claude-sonnet-4.5"
/// max_memory = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub name: String,
    pub description: String,
    pub next_step_prompt: String,
    pub tools: Vec<String>,
    pub model: Option<String>,
    /// Messages kept per plan in conversation memory
    pub max_memory: usize,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let profile = AgentProfile::default();
        Self {
            name: profile.name,
            description: profile.description,
            next_step_prompt: profile.next_step_prompt,
            tools: Vec::new(),
            model: None,
            max_memory: 1000,
        }
    }
}

impl FileAgentConfig {
    pub fn to_profile(&self) -> AgentProfile {
        let mut profile = AgentProfile::new(&self.name)
            .with_description(&self.description)
            .with_next_step_prompt(&self.next_step_prompt)
            .with_tools(self.tools.iter().cloned());
        if let Some(model) = &self.model {
            profile = profile.with_model(model);
        }
        profile
    }

    /// Check configured tool names against the registered ones.
    pub fn validate_tools(&self, registered: &[String]) -> Vec<ConfigIssue> {
        self.tools
            .iter()
            .filter(|name| !registered.contains(name))
            .map(|name| {
                ConfigIssue::warning(
                    ConfigIssueCode::UnknownTool,
                    format!("agent.tools: '{}' is not a registered tool and is ignored", name),
                )
            })
            .collect()
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonPositiveValue,
                "agent.name cannot be empty",
            ));
        }
        if self.max_memory == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonPositiveValue,
                "agent.max_memory must be at least 1",
            ));
        }
        issues
    }
}
