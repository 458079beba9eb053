//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_memory;
pub mod execution_recorder;
pub mod interruption;
pub mod llm_gateway;
pub mod step_progress;
pub mod tool_registry;
