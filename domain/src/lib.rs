//! Domain layer for taskpilot
//!
//! This crate contains the entities and value objects of the agent step
//! engine. It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Step
//!
//! An [`AgentStep`] is driven through think/act cycles until its
//! [`AgentState`] becomes terminal (`COMPLETED`, `FAILED`, `INTERRUPTED`).
//!
//! ## Tools
//!
//! Tools are described by a [`ToolDefinition`] carrying [`ToolCapabilities`]
//! tags (terminal, terminate, form input, error report). The engine routes
//! on those tags rather than on concrete tool types.
//!
//! ## Retry
//!
//! [`RetryPolicy`] classifies LLM failures and computes exponential backoff;
//! [`RetryContext`] collects the failures of one think invocation.

pub mod agent;
pub mod config;
pub mod core;
pub mod prompt;
pub mod record;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use agent::{
    form::{FormInputState, InputItem, InputType, UserFormInput, UserInputWaitState},
    profile::AgentProfile,
    retry::{LlmFailure, RETRYABLE_SIGNATURES, RetryContext, RetryPolicy},
    state::{AgentExecResult, AgentState},
    step::AgentStep,
};
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{
    error::DomainError,
    string::{preview, unquote_json_string},
};
pub use prompt::{AgentPromptTemplate, SystemInfo};
pub use record::entities::{ActToolParam, ThinkActRecord};
pub use session::{
    entities::{Message, Role},
    response::{ContentBlock, LlmResponse, StopReason},
    stream::StreamEvent,
};
pub use tool::{
    context::ToolContext,
    entities::{ToolCallRequest, ToolCapabilities, ToolDefinition, ToolParameter},
    value_objects::{ToolCallResult, ToolError},
};
