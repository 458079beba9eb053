//! Structured configuration issues.
//!
//! Loaders validate values and report problems as data; callers decide
//! whether warnings are printed and whether errors abort startup.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default was substituted.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A duration or count that must be positive was zero.
    NonPositiveValue,
    /// Backoff cap is smaller than its base.
    BackoffCapBelowBase,
    /// Poll interval is not shorter than the deadline it polls against.
    PollIntervalTooLong,
    /// An agent tool name is not a registered tool.
    UnknownTool,
    /// An enum-like string value was not recognised.
    UnknownValue,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
