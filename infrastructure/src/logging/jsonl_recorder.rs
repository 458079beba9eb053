//! JSONL file writer for execution records.
//!
//! Each think/act pair and each batch of tool results is serialized as a
//! single JSON line with a `type` field and `timestamp`, appended to the file
//! via a buffered writer.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use taskpilot_application::{ExecutionRecorder, RecorderError};
use taskpilot_domain::{ActToolParam, AgentStep, ThinkActRecord};
use tracing::warn;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RecordLine<'a> {
    ThinkAct {
        timestamp: String,
        #[serde(rename = "stepId")]
        step_id: &'a str,
        #[serde(rename = "planId")]
        plan_id: &'a str,
        #[serde(rename = "rootPlanId")]
        root_plan_id: &'a str,
        record: &'a ThinkActRecord,
    },
    ActionResult {
        timestamp: String,
        results: &'a [ActToolParam],
    },
}

/// Execution recorder that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on
/// `Drop`.
pub struct JsonlExecutionRecorder {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlExecutionRecorder {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, RecorderError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, line: &RecordLine<'_>) -> Result<(), RecorderError> {
        let json = serde_json::to_string(line)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RecorderError::Unavailable("record writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

impl ExecutionRecorder for JsonlExecutionRecorder {
    fn record_think_and_action(
        &self,
        step: &AgentStep,
        record: &ThinkActRecord,
    ) -> Result<(), RecorderError> {
        self.write_line(&RecordLine::ThinkAct {
            timestamp: timestamp(),
            step_id: &step.step_id,
            plan_id: &step.current_plan_id,
            root_plan_id: &step.root_plan_id,
            record,
        })
    }

    fn record_action_result(&self, params: &[ActToolParam]) -> Result<(), RecorderError> {
        self.write_line(&RecordLine::ActionResult {
            timestamp: timestamp(),
            results: params,
        })
    }
}

impl Drop for JsonlExecutionRecorder {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock()
            && let Err(e) = writer.flush()
        {
            warn!("Could not flush {}: {}", self.path.display(), e);
        }
    }
}
