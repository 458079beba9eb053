//! Retry classification and backoff for LLM calls.
//!
//! Classification is a substring contract over the failure message: only
//! transport-level signatures (DNS resolution, timeouts, dropped connections)
//! are retried. Everything else fails fast.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message fragments that mark a failure as transient.
pub const RETRYABLE_SIGNATURES: &[&str] = &[
    "Failed to resolve",
    "timeout",
    "connection",
    "DNS",
    "WebClientRequestException",
    "DnsNameResolverTimeoutException",
];

/// Retry policy for the think phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(60000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Whether a failure with this message is worth another attempt.
    ///
    /// Absent or empty messages are never retryable.
    pub fn is_retryable(message: Option<&str>) -> bool {
        match message {
            Some(msg) if !msg.is_empty() => RETRYABLE_SIGNATURES.iter().any(|sig| msg.contains(sig)),
            _ => false,
        }
    }

    /// Delay before the attempt following `attempt` (1-indexed).
    ///
    /// `base * 2^(attempt-1)`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// A failed LLM call as seen by the retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmFailure {
    /// Short error kind, e.g. `Timeout` or `Http`.
    pub kind: String,
    pub message: String,
    /// Transport response body when the provider returned one.
    pub response_body: Option<String>,
}

impl LlmFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            response_body: None,
        }
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        RetryPolicy::is_retryable(Some(&self.message))
    }
}

/// Failures observed during one think invocation, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RetryContext {
    failures: Vec<LlmFailure>,
}

impl RetryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.failures.clear();
    }

    pub fn record(&mut self, failure: LlmFailure) {
        self.failures.push(failure);
    }

    pub fn latest(&self) -> Option<&LlmFailure> {
        self.failures.last()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[LlmFailure] {
        &self.failures
    }
}
