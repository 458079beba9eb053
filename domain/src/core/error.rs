//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid plan identity: {0}")]
    InvalidPlanIdentity(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),
}
