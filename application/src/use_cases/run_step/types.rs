//! Type definitions for the step engine.

use taskpilot_domain::{FormInputState, Message, RetryContext, ToolCallRequest, ToolError};
use thiserror::Error;

/// Control-flow errors inside one step invocation.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Operation interrupted")]
    Interrupted,

    #[error(transparent)]
    Dispatch(#[from] ToolDispatchError),
}

/// Failures while dispatching a single tool call.
///
/// Every variant ends the step as `COMPLETED` with the error text. Inside a
/// parallel batch a failing tool only becomes that call's textual result.
#[derive(Error, Debug)]
pub enum ToolDispatchError {
    #[error("{0}")]
    Execution(ToolError),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Form input tool is not awaiting user input (state: {0:?})")]
    FormNotAwaiting(Option<FormInputState>),

    #[error("Tool {0} declares form input but exposes no form state")]
    MissingFormHandle(String),
}

/// What the model proposed during a successful think.
#[derive(Debug, Clone)]
pub struct ThinkProposal {
    pub calls: Vec<ToolCallRequest>,
    /// Assistant text that accompanied the calls
    pub think_output: String,
    /// System prompt plus environment snapshot, as recorded
    pub think_input: String,
    /// Correlation id shared by every call of this act
    pub tool_call_id: String,
    /// Persistable history the prompt was built from
    pub history: Vec<Message>,
}

/// Result of the think phase.
#[derive(Debug)]
pub enum ThinkOutcome {
    /// At least one tool call was proposed.
    Proposed(ThinkProposal),
    /// Every attempt answered without tool calls and without errors.
    NoAction,
    /// LLM calls failed; the context holds every observed failure.
    Failed(RetryContext),
}
