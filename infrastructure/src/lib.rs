//! Infrastructure layer for taskpilot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod interruption;
pub mod llm;
pub mod logging;
pub mod memory;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileAgentConfig, FileConfig, FileLoggingConfig, FileStepConfig,
    FileUserInputConfig,
};
pub use interruption::{PlanExecutionState, PlanInterruptionRegistry};
pub use llm::{ReplayError, ReplayLlmClient};
pub use logging::{JsonlExecutionRecorder, TracingRecorder};
pub use memory::InMemoryConversationMemory;
pub use tools::{
    ErrorReportTool, FormInputTool, TerminateTool, ToolRegistry, UuidGenerateTool,
};
