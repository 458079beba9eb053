//! Context handed to a tool at execution time.

use serde::{Deserialize, Serialize};

/// Lineage of a tool invocation.
///
/// Parallel batches derive one context per call that keeps the parent's
/// `tool_call_id` and `plan_depth`, so nested executions can tell where they
/// were spawned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContext {
    pub tool_call_id: String,
    pub plan_depth: u32,
    pub current_plan_id: String,
    pub root_plan_id: String,
    /// Provider call id of the specific call, when one exists
    #[serde(default)]
    pub call_id: Option<String>,
}

impl ToolContext {
    pub fn new(
        tool_call_id: impl Into<String>,
        plan_depth: u32,
        current_plan_id: impl Into<String>,
        root_plan_id: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            plan_depth,
            current_plan_id: current_plan_id.into(),
            root_plan_id: root_plan_id.into(),
            call_id: None,
        }
    }

    /// Context for one call of a batch, inheriting this context's lineage.
    pub fn derive_for_call(&self, call_id: impl Into<String>) -> Self {
        Self {
            call_id: Some(call_id.into()),
            ..self.clone()
        }
    }
}
