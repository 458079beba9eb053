//! Tool Registry
//!
//! The [`ToolRegistry`] owns the tool instances of one plan run and
//! implements [`ToolRegistryPort`]. Names are unique; registering a second
//! tool under an existing name is rejected.
//!
//! # Usage
//!
//! ```ignore
//! use taskpilot_infrastructure::tools::ToolRegistry;
//!
//! let registry = ToolRegistry::with_builtins();
//! assert!(registry.resolve("terminate").is_some());
//! ```
//!
//! Form tools carry per-instance state, so build one registry per plan run
//! rather than sharing it across concurrent plans.

use std::collections::HashMap;
use std::sync::Arc;

use taskpilot_application::{Tool, ToolRegistryPort};
use taskpilot_domain::DomainError;
use tracing::debug;

use super::{ErrorReportTool, FormInputTool, TerminateTool, UuidGenerateTool};

/// Name-indexed set of tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every model-callable built-in tool.
    ///
    /// `system_error_report` is owned by the step engine and never offered
    /// to the model.
    pub fn with_builtins() -> Self {
        let builtins: Vec<Arc<dyn Tool>> = vec![
            Arc::new(TerminateTool::new()),
            Arc::new(ErrorReportTool::new()),
            Arc::new(FormInputTool::new()),
            Arc::new(UuidGenerateTool::new()),
        ];

        let tools = builtins
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        Self { tools }
    }

    /// Add a tool under its definition name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), DomainError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(DomainError::DuplicateTool(name));
        }
        debug!("Registered tool {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, DomainError> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolRegistryPort for ToolRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ERROR_REPORT, FORM_INPUT, TERMINATE, UUID_GENERATE};
    use taskpilot_application::SYSTEM_ERROR_REPORT;

    #[test]
    fn test_builtins_are_registered_sorted() {
        let registry = ToolRegistry::with_builtins();

        assert_eq!(
            registry.tool_names(),
            vec![
                ERROR_REPORT.to_string(),
                FORM_INPUT.to_string(),
                TERMINATE.to_string(),
                UUID_GENERATE.to_string(),
            ]
        );
        assert!(registry.resolve(FORM_INPUT).unwrap().form_input().is_some());
        assert!(registry.resolve(TERMINATE).unwrap().capabilities().terminate);
        assert!(registry.resolve(SYSTEM_ERROR_REPORT).is_none());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(TerminateTool::new())).unwrap();

        let err = registry
            .register(Arc::new(TerminateTool::new()))
            .unwrap_err();

        assert_eq!(err, DomainError::DuplicateTool(TERMINATE.to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_definitions_skip_unknown_names() {
        let registry = ToolRegistry::with_builtins();

        let definitions =
            registry.definitions(&[TERMINATE.to_string(), "no_such_tool".to_string()]);

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, TERMINATE);
    }

    #[test]
    fn test_each_registry_gets_its_own_form() {
        let first = ToolRegistry::with_builtins();
        let second = ToolRegistry::with_builtins();

        let a = first.resolve(FORM_INPUT).unwrap().form_input().unwrap();
        let b = second.resolve(FORM_INPUT).unwrap().form_input().unwrap();

        assert!(!a.same_instance(&b));
    }
}
