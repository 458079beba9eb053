//! Port for execution history recording.
//!
//! The engine reports every think/act pair and every tool result through
//! [`ExecutionRecorder`]. Recording is an audit side channel: the engine logs
//! a failed write and carries on.

use taskpilot_domain::{ActToolParam, AgentStep, ThinkActRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Recorder I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recorder serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recorder unavailable: {0}")]
    Unavailable(String),
}

/// Audit sink for think/act history.
pub trait ExecutionRecorder: Send + Sync {
    fn record_think_and_action(
        &self,
        step: &AgentStep,
        record: &ThinkActRecord,
    ) -> Result<(), RecorderError>;

    fn record_action_result(&self, params: &[ActToolParam]) -> Result<(), RecorderError>;
}

/// No-op implementation for tests and when recording is disabled.
pub struct NoRecorder;

impl ExecutionRecorder for NoRecorder {
    fn record_think_and_action(
        &self,
        _step: &AgentStep,
        _record: &ThinkActRecord,
    ) -> Result<(), RecorderError> {
        Ok(())
    }

    fn record_action_result(&self, _params: &[ActToolParam]) -> Result<(), RecorderError> {
        Ok(())
    }
}
