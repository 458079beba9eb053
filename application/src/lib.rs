//! Application layer for taskpilot
//!
//! This crate contains the step engine use cases, port definitions, and
//! engine parameters. It depends only on the domain layer.

pub mod config;
pub mod form_input;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::StepParams;
pub use form_input::FormInputHandle;
pub use ports::{
    conversation_memory::ConversationMemory,
    execution_recorder::{ExecutionRecorder, NoRecorder, RecorderError},
    interruption::{InterruptionOracle, NeverInterrupt},
    llm_gateway::{GatewayError, LlmClient, LlmRequest, RequestMetadata, StreamHandle},
    step_progress::{NoStepProgress, StepProgressNotifier},
    tool_registry::{Tool, ToolRegistryPort},
};
pub use use_cases::run_agent::{RunAgentError, RunAgentInput, RunAgentOutput, RunAgentUseCase};
pub use use_cases::run_step::{
    ErrorEscalationHandler, ParallelToolCoordinator, SYSTEM_ERROR_REPORT, StepExecutor,
    SystemErrorReportTool, ThinkOutcome, ToolRoute,
};
pub use use_cases::user_input::{UserInputError, UserInputWaitCoordinator};
