//! LLM client port
//!
//! Defines the interface for requesting completions from an LLM provider.
//! Transport, authentication and provider wire formats live behind it.

use async_trait::async_trait;
use std::collections::BTreeMap;
use taskpilot_domain::{
    ContentBlock, LlmFailure, LlmResponse, Message, StopReason, StreamEvent, ToolDefinition,
};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM requests
///
/// Retry classification reads the rendered message, so every transient
/// variant renders one of the retryable signatures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Failed to resolve host: {0}")]
    Dns(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<String>,
    },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Short kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            GatewayError::Dns(_) => "DnsResolution",
            GatewayError::Timeout(_) => "Timeout",
            GatewayError::Connection(_) => "Connection",
            GatewayError::Http { .. } => "Http",
            GatewayError::RequestFailed(_) => "RequestFailed",
            GatewayError::InvalidRequest(_) => "InvalidRequest",
            GatewayError::Other(_) => "Other",
        }
    }

    /// Provider response body, when the transport returned one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            GatewayError::Http { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn to_failure(&self) -> LlmFailure {
        let failure = LlmFailure::new(self.kind_name(), self.to_string());
        match self.response_body() {
            Some(body) => failure.with_response_body(body),
            None => failure,
        }
    }
}

/// Correlation metadata attached to each request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestMetadata {
    pub tool_call_id: String,
    pub plan_depth: u32,
}

/// One request to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmRequest {
    /// Model override; `None` uses the client's default.
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub metadata: RequestMetadata,
}

/// Handle for receiving streaming events from an LLM request.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and assemble the final response.
    ///
    /// `on_chunk` sees every text delta as it arrives. A `Completed` event
    /// with content wins over the assembled deltas; an empty one (or a
    /// channel closed early) returns what the deltas built.
    pub async fn collect_response(
        mut self,
        mut on_chunk: impl FnMut(&str) + Send,
    ) -> Result<LlmResponse, GatewayError> {
        let mut text = String::new();
        let mut calls: BTreeMap<usize, PartialToolCall> = BTreeMap::new();

        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_chunk(&chunk);
                    text.push_str(&chunk);
                }
                StreamEvent::ToolCallDelta {
                    index,
                    id,
                    name,
                    arguments_delta,
                } => {
                    let call = calls.entry(index).or_default();
                    if let Some(id) = id {
                        call.id = id;
                    }
                    if let Some(name) = name {
                        call.name = name;
                    }
                    if let Some(fragment) = arguments_delta {
                        call.arguments.push_str(&fragment);
                    }
                }
                StreamEvent::Completed(response) => {
                    if !response.content.is_empty() {
                        return Ok(response);
                    }
                    return Ok(assemble(text, calls, response.model));
                }
                StreamEvent::Error(e) => return Err(GatewayError::RequestFailed(e)),
            }
        }
        Ok(assemble(text, calls, None))
    }
}

fn assemble(
    text: String,
    calls: BTreeMap<usize, PartialToolCall>,
    model: Option<String>,
) -> LlmResponse {
    let mut content = Vec::new();
    if !text.is_empty() {
        content.push(ContentBlock::text(text));
    }
    let has_calls = !calls.is_empty();
    content.extend(
        calls
            .into_values()
            .filter(|call| !call.name.is_empty())
            .map(|call| ContentBlock::tool_use(call.id, call.name, call.arguments)),
    );
    LlmResponse {
        content,
        stop_reason: Some(if has_calls {
            StopReason::ToolUse
        } else {
            StopReason::EndTurn
        }),
        model,
    }
}

/// Client for LLM completions.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Start a streaming request.
    async fn stream(&self, request: LlmRequest) -> Result<StreamHandle, GatewayError>;

    /// Send a request and wait for the assembled response.
    async fn send(&self, request: LlmRequest) -> Result<LlmResponse, GatewayError> {
        self.stream(request).await?.collect_response(|_| {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_domain::RetryPolicy;

    async fn handle_from(events: Vec<StreamEvent>) -> StreamHandle {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.send(event).await.unwrap();
        }
        StreamHandle::new(rx)
    }

    #[test]
    fn test_transient_errors_render_retryable_messages() {
        for err in [
            GatewayError::Dns("api.example.com".into()),
            GatewayError::Timeout("30s".into()),
            GatewayError::Connection("reset by peer".into()),
        ] {
            assert!(
                RetryPolicy::is_retryable(Some(&err.to_string())),
                "{err} should be retryable"
            );
        }
        let http = GatewayError::Http {
            status: 400,
            message: "bad request".into(),
            body: None,
        };
        assert!(!RetryPolicy::is_retryable(Some(&http.to_string())));
    }

    #[test]
    fn test_to_failure_carries_body() {
        let err = GatewayError::Http {
            status: 500,
            message: "upstream".into(),
            body: Some("{\"error\":\"overloaded\"}".into()),
        };
        let failure = err.to_failure();
        assert_eq!(failure.kind, "Http");
        assert_eq!(failure.message, "HTTP 500: upstream");
        assert_eq!(
            failure.response_body.as_deref(),
            Some("{\"error\":\"overloaded\"}")
        );
    }

    #[tokio::test]
    async fn test_collect_assembles_deltas() {
        let handle = handle_from(vec![
            StreamEvent::Delta("Let me ".into()),
            StreamEvent::Delta("check".into()),
            StreamEvent::ToolCallDelta {
                index: 0,
                id: Some("c1".into()),
                name: Some("uuid_generate".into()),
                arguments_delta: Some("{\"action\":".into()),
            },
            StreamEvent::ToolCallDelta {
                index: 0,
                id: None,
                name: None,
                arguments_delta: Some("\"generate_uuid\"}".into()),
            },
            StreamEvent::Completed(LlmResponse::default()),
        ])
        .await;

        let mut chunks = Vec::new();
        let response = handle
            .collect_response(|c| chunks.push(c.to_string()))
            .await
            .unwrap();

        assert_eq!(chunks, vec!["Let me ", "check"]);
        assert_eq!(response.text_content(), "Let me check");
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, "{\"action\":\"generate_uuid\"}");
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
    }

    #[tokio::test]
    async fn test_collect_prefers_completed_content() {
        let handle = handle_from(vec![
            StreamEvent::Delta("partial".into()),
            StreamEvent::Completed(LlmResponse::from_text("final")),
        ])
        .await;
        let response = handle.collect_response(|_| {}).await.unwrap();
        assert_eq!(response.text_content(), "final");
    }

    #[tokio::test]
    async fn test_collect_stream_error() {
        let handle = handle_from(vec![StreamEvent::Error("connection reset".into())]).await;
        let err = handle.collect_response(|_| {}).await.unwrap_err();
        assert_eq!(err, GatewayError::RequestFailed("connection reset".into()));
    }

    #[tokio::test]
    async fn test_collect_closed_channel_returns_partial() {
        let handle = handle_from(vec![StreamEvent::Delta("half".into())]).await;
        let response = handle.collect_response(|_| {}).await.unwrap();
        assert_eq!(response.text_content(), "half");
    }
}
