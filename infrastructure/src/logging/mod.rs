//! Logging infrastructure: execution records.
//!
//! Provides [`JsonlExecutionRecorder`], a JSONL file writer, and
//! [`TracingRecorder`], both implementing the
//! [`ExecutionRecorder`](taskpilot_application::ExecutionRecorder) port.

mod jsonl_recorder;
mod tracing_recorder;

pub use jsonl_recorder::JsonlExecutionRecorder;
pub use tracing_recorder::TracingRecorder;
