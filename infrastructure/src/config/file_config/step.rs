//! Step engine configuration from TOML (`[step]` section)

use serde::{Deserialize, Serialize};
use taskpilot_domain::{ConfigIssue, ConfigIssueCode};

/// Raw step configuration from TOML
///
/// # Example
///
/// ```toml
/// [step]
/// max_think_retries = 3
/// backoff_base_ms = 2000
/// backoff_max_ms = 60000
/// max_steps = 20
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStepConfig {
    /// Attempts per think phase
    pub max_think_retries: u32,
    /// First backoff delay in milliseconds
    pub backoff_base_ms: u64,
    /// Backoff cap in milliseconds
    pub backoff_max_ms: u64,
    /// Step invocations per run
    pub max_steps: usize,
}

impl Default for FileStepConfig {
    fn default() -> Self {
        Self {
            max_think_retries: 3,
            backoff_base_ms: 2000,
            backoff_max_ms: 60000,
            max_steps: 20,
        }
    }
}

impl FileStepConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_think_retries == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonPositiveValue,
                "step.max_think_retries must be at least 1",
            ));
        }
        if self.max_steps == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NonPositiveValue,
                "step.max_steps must be at least 1",
            ));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BackoffCapBelowBase,
                format!(
                    "step.backoff_max_ms ({}) is below step.backoff_base_ms ({}); every retry waits {}ms",
                    self.backoff_max_ms, self.backoff_base_ms, self.backoff_max_ms
                ),
            ));
        }
        issues
    }
}
