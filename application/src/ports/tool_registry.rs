//! Tool registry port
//!
//! Defines the interface for resolving tools by name and executing them.

use crate::form_input::FormInputHandle;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use taskpilot_domain::{ToolCapabilities, ToolContext, ToolDefinition, ToolError};

/// A tool the model can call.
///
/// Implementations (adapters) live in the infrastructure layer; the engine
/// owns only the system error report tool.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    fn capabilities(&self) -> ToolCapabilities {
        self.definition().capabilities
    }

    /// Run the tool. Errors are folded into the call result by the engine.
    async fn execute(&self, args: &Map<String, Value>, ctx: &ToolContext)
    -> Result<String, ToolError>;

    /// Whether a terminal tool may end the step right now.
    fn can_terminate(&self) -> bool {
        true
    }

    /// State shown to the model in the environment snapshot.
    fn current_state(&self) -> String {
        String::new()
    }

    /// Shared form state for form-input tools.
    fn form_input(&self) -> Option<FormInputHandle> {
        None
    }

    /// Release per-plan resources.
    fn cleanup(&self, _plan_id: &str) {}
}

/// Port for resolving tools by name
pub trait ToolRegistryPort: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>>;

    /// Names of every registered tool, sorted.
    fn tool_names(&self) -> Vec<String>;

    /// Definitions for the given names; unknown names are skipped.
    fn definitions(&self, names: &[String]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.resolve(name))
            .map(|tool| tool.definition().clone())
            .collect()
    }
}
