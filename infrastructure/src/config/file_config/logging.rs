//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use taskpilot_domain::{ConfigIssue, ConfigIssueCode};

/// Raw logging configuration from TOML
///
/// # Example
///
/// ```toml
/// [logging]
/// level = "info"
/// log_dir = "~/.local/share/taskpilot/logs"
/// record_file = "runs/execution.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Default filter when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,
    /// Directory for the rolling file log
    pub log_dir: Option<PathBuf>,
    /// JSONL execution record destination
    pub record_file: Option<PathBuf>,
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl FileLoggingConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        match &self.level {
            Some(level) if !LEVELS.contains(&level.to_lowercase().as_str()) => {
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownValue,
                    format!(
                        "logging.level: unknown value '{}', expected one of {}",
                        level,
                        LEVELS.join(", ")
                    ),
                )]
            }
            _ => Vec::new(),
        }
    }
}
