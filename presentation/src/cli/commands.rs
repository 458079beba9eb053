//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Formatted summary of every round
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for taskpilot
#[derive(Parser, Debug)]
#[command(name = "taskpilot")]
#[command(author, version, about = "Think/act step engine for tool-using agents")]
#[command(long_about = r#"
taskpilot drives an agent step through think/act cycles: the model proposes
tool calls, the engine runs them (in parallel when there are several) and
feeds the results back until a terminal tool ends the step.

Configuration files are loaded from (in priority order):
1. TASKPILOT_* environment variables (e.g. TASKPILOT_STEP__MAX_STEPS=5)
2. --config <path>     Explicit config file
3. ./taskpilot.toml    Project-level config
4. ~/.config/taskpilot/config.toml   Global config

Example:
  taskpilot run --script demos/uuid.json "Generate two identifiers"
  taskpilot run --script demos/form.json --answer env=prod -o json
  taskpilot config
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one step to completion against a replay script
    Run(RunArgs),

    /// Show effective configuration and the files it came from
    Config,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// What the step should achieve
    #[arg(default_value = "Complete the scripted task")]
    pub requirement: String,

    /// JSON script of model responses to replay
    #[arg(short, long, value_name = "FILE")]
    pub script: PathBuf,

    /// Plan identifier (defaults to a random one)
    #[arg(long, value_name = "ID")]
    pub plan_id: Option<String>,

    /// Override the maximum number of think/act rounds
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// Preset form answer (can be specified multiple times)
    #[arg(long = "answer", value_name = "NAME=VALUE", value_parser = parse_answer)]
    pub answers: Vec<(String, String)>,

    /// Never prompt for form input on the terminal
    #[arg(long)]
    pub no_input: bool,

    /// Append think/act records to this JSONL file
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parse `NAME=VALUE`
pub fn parse_answer(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}
