//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_agent;
pub mod run_step;
pub(crate) mod shared;
pub(crate) mod tool_helpers;
pub mod user_input;
