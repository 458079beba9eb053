//! Prompt templates for the think phase

use crate::agent::profile::AgentProfile;
use crate::agent::step::AgentStep;
use std::collections::BTreeMap;

/// Host facts injected into the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub os: String,
    pub current_time: String,
}

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// System prompt for one think attempt.
    pub fn step_system(profile: &AgentProfile, step: &AgentStep, system: &SystemInfo) -> String {
        let requirement = if step.requirement.is_empty() {
            "(no explicit requirement)"
        } else {
            step.requirement.as_str()
        };

        format!(
            r#"## System information
- Operating system: {os}
- Current time: {time}

## Agent
You are {name}. {description}

## Current step
- Step id: {step_id}
- Plan id: {plan_id}
- Requirement: {requirement}

## Instructions
{next_step}
Always respond by calling one or more tools. Do not call terminate or form_input together with other tools.
"#,
            os = system.os,
            time = system.current_time,
            name = profile.name,
            description = profile.description,
            step_id = step.step_id,
            plan_id = step.current_plan_id,
            requirement = requirement,
            next_step = profile.next_step_prompt,
        )
    }

    /// Render per-tool state as the environment snapshot body.
    ///
    /// Tools with empty state are skipped.
    pub fn env_data(states: &BTreeMap<String, String>) -> String {
        states
            .iter()
            .filter(|(_, state)| !state.trim().is_empty())
            .map(|(tool, state)| format!("{} context information:\n    {}\n", tool, state))
            .collect()
    }

    /// Full text of the environment snapshot message.
    pub fn env_snapshot(env_data: &str) -> String {
        format!("- Current step environment information:\n{}", env_data)
    }
}
