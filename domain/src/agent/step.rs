//! The agent step entity.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One plan step being driven through think/act cycles.
///
/// `root_plan_id` identifies the top-level execution; nested sub-plans share
/// it and therefore share one form slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub step_id: String,
    pub current_plan_id: String,
    pub root_plan_id: String,
    /// Nesting depth of the current plan below the root (root = 0).
    pub plan_depth: u32,
    /// Human-readable requirement this step has to fulfil.
    #[serde(default)]
    pub requirement: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl AgentStep {
    pub fn new(
        step_id: impl Into<String>,
        current_plan_id: impl Into<String>,
        root_plan_id: impl Into<String>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            current_plan_id: current_plan_id.into(),
            root_plan_id: root_plan_id.into(),
            plan_depth: 0,
            requirement: String::new(),
            error_message: None,
        }
    }

    pub fn with_plan_depth(mut self, depth: u32) -> Self {
        self.plan_depth = depth;
        self
    }

    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = requirement.into();
        self
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn is_sub_plan(&self) -> bool {
        self.current_plan_id != self.root_plan_id
    }

    /// Step, plan and root ids must all be present; a root step sits at
    /// depth 0.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("step id", &self.step_id),
            ("current plan id", &self.current_plan_id),
            ("root plan id", &self.root_plan_id),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidPlanIdentity(format!("{} is empty", field)));
            }
        }
        if !self.is_sub_plan() && self.plan_depth != 0 {
            return Err(DomainError::InvalidPlanIdentity(format!(
                "root plan {} has depth {}",
                self.root_plan_id, self.plan_depth
            )));
        }
        Ok(())
    }
}
