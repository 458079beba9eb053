//! Streaming events for LLM requests.
//!
//! A stream yields text deltas and incremental tool-call fragments and ends
//! with either [`StreamEvent::Completed`] or [`StreamEvent::Error`].

use super::response::LlmResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// Incremental tool call data.
    ///
    /// The first fragment for an `index` usually carries `id` and `name`;
    /// later fragments carry `arguments_delta` pieces to concatenate.
    ToolCallDelta {
        index: usize,
        id: Option<String>,
        name: Option<String>,
        arguments_delta: Option<String>,
    },
    /// The full structured response (signals stream end).
    ///
    /// An empty response here means "use what the deltas assembled".
    Completed(LlmResponse),
    /// An error that occurred mid-stream.
    Error(String),
}

impl StreamEvent {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_text_returns_content() {
        let event = StreamEvent::Delta("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn error_is_terminal() {
        let event = StreamEvent::Error("oops".to_string());
        assert_eq!(event.text(), None);
        assert!(event.is_terminal());
    }

    #[test]
    fn tool_call_delta_is_not_terminal() {
        let event = StreamEvent::ToolCallDelta {
            index: 0,
            id: Some("c1".to_string()),
            name: Some("terminate".to_string()),
            arguments_delta: None,
        };
        assert!(!event.is_terminal());
    }

    #[test]
    fn completed_is_terminal() {
        assert!(StreamEvent::Completed(LlmResponse::from_text("done")).is_terminal());
    }
}
