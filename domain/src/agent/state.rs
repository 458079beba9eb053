//! Step lifecycle state and the result of one step invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an agent step.
///
/// `InProgress` allows another think/act cycle; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentState {
    InProgress,
    Completed,
    Failed,
    Interrupted,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AgentState::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::InProgress => "IN_PROGRESS",
            AgentState::Completed => "COMPLETED",
            AgentState::Failed => "FAILED",
            AgentState::Interrupted => "INTERRUPTED",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single `step()` call: the textual result and the new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentExecResult {
    pub result: String,
    pub state: AgentState,
}

impl AgentExecResult {
    pub fn new(result: impl Into<String>, state: AgentState) -> Self {
        Self {
            result: result.into(),
            state,
        }
    }

    pub fn in_progress(result: impl Into<String>) -> Self {
        Self::new(result, AgentState::InProgress)
    }

    pub fn completed(result: impl Into<String>) -> Self {
        Self::new(result, AgentState::Completed)
    }

    pub fn failed(result: impl Into<String>) -> Self {
        Self::new(result, AgentState::Failed)
    }

    pub fn interrupted(result: impl Into<String>) -> Self {
        Self::new(result, AgentState::Interrupted)
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
