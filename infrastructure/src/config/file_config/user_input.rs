//! Form slot and user input wait configuration (`[user_input]` section)

use serde::{Deserialize, Serialize};
use taskpilot_domain::{ConfigIssue, ConfigIssueCode};

/// Raw user input configuration from TOML
///
/// # Example
///
/// ```toml
/// [user_input]
/// timeout_secs = 300
/// poll_interval_ms = 500
/// interruption_check_ms = 2000
/// lock_timeout_secs = 5
/// slot_poll_interval_ms = 100
/// slot_wait_ceiling_secs = 300
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUserInputConfig {
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub interruption_check_ms: u64,
    pub lock_timeout_secs: u64,
    pub slot_poll_interval_ms: u64,
    pub slot_wait_ceiling_secs: u64,
}

impl Default for FileUserInputConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            poll_interval_ms: 500,
            interruption_check_ms: 2000,
            lock_timeout_secs: 5,
            slot_poll_interval_ms: 100,
            slot_wait_ceiling_secs: 300,
        }
    }
}

impl FileUserInputConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("timeout_secs", self.timeout_secs),
            ("poll_interval_ms", self.poll_interval_ms),
            ("interruption_check_ms", self.interruption_check_ms),
            ("lock_timeout_secs", self.lock_timeout_secs),
            ("slot_poll_interval_ms", self.slot_poll_interval_ms),
            ("slot_wait_ceiling_secs", self.slot_wait_ceiling_secs),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::NonPositiveValue,
                    format!("user_input.{} must be greater than 0", field),
                ));
            }
        }
        if self.poll_interval_ms >= self.timeout_secs.saturating_mul(1000) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::PollIntervalTooLong,
                "user_input.poll_interval_ms is not shorter than user_input.timeout_secs",
            ));
        }
        if self.slot_poll_interval_ms >= self.slot_wait_ceiling_secs.saturating_mul(1000) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::PollIntervalTooLong,
                "user_input.slot_poll_interval_ms is not shorter than user_input.slot_wait_ceiling_secs",
            ));
        }
        issues
    }
}
