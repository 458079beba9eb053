//! Scripted LLM client.
//!
//! [`ReplayLlmClient`] answers each request with the next turn of a JSON
//! script and streams it through a [`StreamHandle`] the same way a network
//! provider would: text deltas, tool-call fragments, then `Completed`.
//!
//! ```json
//! {
//!   "turns": [
//!     { "type": "error", "kind": "timeout", "message": "upstream slow" },
//!     { "type": "response", "text": "Generating an id",
//!       "tool_calls": [{ "id": "c1", "name": "uuid_generate", "arguments": {"count": 2} }] },
//!     { "type": "response",
//!       "tool_calls": [{ "id": "c2", "name": "terminate", "arguments": {"message": "done"} }] }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use taskpilot_application::{GatewayError, LlmClient, LlmRequest, StreamHandle};
use taskpilot_domain::{LlmResponse, StreamEvent};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 64;

/// Errors loading a replay script
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read replay script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid replay script: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayErrorKind {
    Dns,
    Timeout,
    Connection,
    Http,
    RequestFailed,
    InvalidRequest,
    Other,
}

/// A tool call in a scripted response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayToolCall {
    pub id: String,
    pub name: String,
    /// Either a JSON object or a raw (possibly malformed) argument string.
    #[serde(default)]
    pub arguments: Value,
}

impl ReplayToolCall {
    fn raw_arguments(&self) -> String {
        match &self.arguments {
            Value::String(raw) => raw.clone(),
            Value::Null => "{}".to_string(),
            other => other.to_string(),
        }
    }
}

/// One scripted answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayTurn {
    Response {
        #[serde(default)]
        text: String,
        #[serde(default)]
        tool_calls: Vec<ReplayToolCall>,
        #[serde(default)]
        delay_ms: u64,
    },
    Error {
        kind: ReplayErrorKind,
        #[serde(default)]
        message: String,
        #[serde(default)]
        status: Option<u16>,
        #[serde(default)]
        body: Option<String>,
    },
}

impl ReplayTurn {
    fn to_gateway_error(&self) -> Option<GatewayError> {
        let ReplayTurn::Error {
            kind,
            message,
            status,
            body,
        } = self
        else {
            return None;
        };
        let message = message.clone();
        Some(match kind {
            ReplayErrorKind::Dns => GatewayError::Dns(message),
            ReplayErrorKind::Timeout => GatewayError::Timeout(message),
            ReplayErrorKind::Connection => GatewayError::Connection(message),
            ReplayErrorKind::Http => GatewayError::Http {
                status: status.unwrap_or(500),
                message,
                body: body.clone(),
            },
            ReplayErrorKind::RequestFailed => GatewayError::RequestFailed(message),
            ReplayErrorKind::InvalidRequest => GatewayError::InvalidRequest(message),
            ReplayErrorKind::Other => GatewayError::Other(message),
        })
    }
}

#[derive(Deserialize)]
struct ReplayScript {
    #[serde(default)]
    model: Option<String>,
    turns: Vec<ReplayTurn>,
}

/// LLM client that replays a fixed script of turns.
pub struct ReplayLlmClient {
    model: Option<String>,
    turns: Mutex<VecDeque<ReplayTurn>>,
}

impl ReplayLlmClient {
    pub fn new(turns: Vec<ReplayTurn>) -> Self {
        Self {
            model: None,
            turns: Mutex::new(turns.into()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let script: ReplayScript = serde_json::from_str(json)?;
        Ok(Self {
            model: script.model,
            turns: Mutex::new(script.turns.into()),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Turns not yet replayed
    pub async fn remaining(&self) -> usize {
        self.turns.lock().await.len()
    }
}

#[async_trait]
impl LlmClient for ReplayLlmClient {
    async fn stream(&self, request: LlmRequest) -> Result<StreamHandle, GatewayError> {
        let turn = self.turns.lock().await.pop_front();
        let Some(turn) = turn else {
            warn!(
                "Replay script exhausted (tool call {})",
                request.metadata.tool_call_id
            );
            return Err(GatewayError::Other("replay script exhausted".to_string()));
        };
        if let Some(err) = turn.to_gateway_error() {
            debug!("Replaying error: {}", err);
            return Err(err);
        }
        let ReplayTurn::Response {
            text,
            tool_calls,
            delay_ms,
        } = turn
        else {
            return Err(GatewayError::Other("unexpected replay turn".to_string()));
        };

        debug!(
            "Replaying response with {} tool calls for {} messages",
            tool_calls.len(),
            request.messages.len()
        );
        let model = request.model.or_else(|| self.model.clone());
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            for chunk in text.split_inclusive(' ') {
                if tx.send(StreamEvent::Delta(chunk.to_string())).await.is_err() {
                    return;
                }
            }
            for (index, call) in tool_calls.iter().enumerate() {
                let event = StreamEvent::ToolCallDelta {
                    index,
                    id: Some(call.id.clone()),
                    name: Some(call.name.clone()),
                    arguments_delta: Some(call.raw_arguments()),
                };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            let done = LlmResponse {
                model,
                ..LlmResponse::default()
            };
            let _ = tx.send(StreamEvent::Completed(done)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}
