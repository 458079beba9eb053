//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types.

mod agent;
mod logging;
mod step;
mod user_input;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use step::FileStepConfig;
pub use user_input::FileUserInputConfig;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskpilot_application::StepParams;
use taskpilot_domain::ConfigIssue;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Think retry and loop settings
    pub step: FileStepConfig,
    /// Form slot and input wait settings
    pub user_input: FileUserInputConfig,
    /// Agent profile
    pub agent: FileAgentConfig,
    /// Logging and execution records
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.step.validate();
        issues.extend(self.user_input.validate());
        issues.extend(self.agent.validate());
        issues.extend(self.logging.validate());
        issues
    }

    /// Engine parameters described by this configuration.
    pub fn step_params(&self) -> StepParams {
        let input = &self.user_input;
        StepParams::default()
            .with_max_think_retries(self.step.max_think_retries)
            .with_backoff(
                Duration::from_millis(self.step.backoff_base_ms),
                Duration::from_millis(self.step.backoff_max_ms),
            )
            .with_max_steps(self.step.max_steps)
            .with_form_lock_timeout(Duration::from_secs(input.lock_timeout_secs))
            .with_slot_wait(
                Duration::from_millis(input.slot_poll_interval_ms),
                Duration::from_secs(input.slot_wait_ceiling_secs),
            )
            .with_input_polling(
                Duration::from_millis(input.poll_interval_ms),
                Duration::from_millis(input.interruption_check_ms),
            )
            .with_user_input_timeout(Duration::from_secs(input.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_domain::{ConfigIssueCode, Severity};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[step]
max_think_retries = 5
backoff_base_ms = 500
max_steps = 8

[user_input]
timeout_secs = 60

[agent]
name = "release-bot"
tools = ["terminate", "form_input"]
model = "claude-sonnet-4.5"

[logging]
level = "debug"
record_file = "runs/execution.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.step.max_think_retries, 5);
        assert_eq!(config.step.backoff_max_ms, 60000);
        assert_eq!(config.user_input.timeout_secs, 60);
        assert_eq!(config.user_input.poll_interval_ms, 500);
        assert_eq!(config.agent.tools, vec!["terminate", "form_input"]);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.validate().is_empty());

        let profile = config.agent.to_profile();
        assert_eq!(profile.name, "release-bot");
        assert_eq!(profile.model.as_deref(), Some("claude-sonnet-4.5"));
    }

    #[test]
    fn test_default_config_matches_engine_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.step_params(), StepParams::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_step_params_conversion() {
        let config: FileConfig = toml::from_str(
            r#"
[step]
backoff_base_ms = 100
backoff_max_ms = 1000

[user_input]
timeout_secs = 10
interruption_check_ms = 250
"#,
        )
        .unwrap();

        let params = config.step_params();
        assert_eq!(params.backoff_base, Duration::from_millis(100));
        assert_eq!(params.backoff_max, Duration::from_secs(1));
        assert_eq!(params.user_input_timeout, Duration::from_secs(10));
        assert_eq!(params.interruption_check_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_validate_reports_errors_and_warnings() {
        let config: FileConfig = toml::from_str(
            r#"
[step]
max_think_retries = 0
backoff_base_ms = 5000
backoff_max_ms = 1000

[logging]
level = "loud"
"#,
        )
        .unwrap();

        let issues = config.validate();
        assert!(issues.iter().any(|i| i.is_error()
            && i.code == ConfigIssueCode::NonPositiveValue
            && i.message.contains("max_think_retries")));
        assert!(issues.iter().any(|i| i.severity == Severity::Warning
            && i.code == ConfigIssueCode::BackoffCapBelowBase));
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::UnknownValue));
    }

    #[test]
    fn test_validate_tools_against_registry() {
        let config: FileConfig = toml::from_str(
            r#"
[agent]
tools = ["terminate", "shell"]
"#,
        )
        .unwrap();

        let issues = config
            .agent
            .validate_tools(&["terminate".to_string(), "form_input".to_string()]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownTool);
        assert!(issues[0].message.contains("'shell'"));
    }
}
