//! Prompt domain
//!
//! Templates used to assemble the think-phase prompt.

pub mod agent;

pub use agent::{AgentPromptTemplate, SystemInfo};
