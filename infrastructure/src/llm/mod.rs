//! LLM client adapters

mod replay;

pub use replay::{ReplayError, ReplayErrorKind, ReplayLlmClient, ReplayToolCall, ReplayTurn};
