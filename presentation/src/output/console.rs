//! Console output formatter for run results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use serde_json::json;
use taskpilot_application::RunAgentOutput;
use taskpilot_domain::AgentState;

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run
    pub fn format(output: &RunAgentOutput) -> String {
        let mut text = String::new();

        text.push_str(&Self::header("Step Result"));
        text.push('\n');

        text.push_str(&format!(
            "{} {}\n",
            "Step:".cyan().bold(),
            output.step.step_id
        ));
        text.push_str(&format!(
            "{} {} (root {}, depth {})\n",
            "Plan:".cyan().bold(),
            output.step.current_plan_id,
            output.step.root_plan_id,
            output.step.plan_depth
        ));
        if !output.step.requirement.is_empty() {
            text.push_str(&format!(
                "{} {}\n",
                "Requirement:".cyan().bold(),
                output.step.requirement
            ));
        }

        text.push_str(&Self::section_header("Rounds"));
        for (i, result) in output.results.iter().enumerate() {
            text.push_str(&format!(
                "  {:>2}. {} {}\n",
                i + 1,
                Self::state(result.state),
                Self::indent_tail(&result.result, "      ")
            ));
        }

        text.push_str(&Self::section_header("Outcome"));
        text.push_str(&format!(
            "\n{} {}\n",
            Self::state(output.final_result.state),
            output.final_result.result
        ));
        if let Some(error) = &output.step.error_message {
            text.push_str(&format!("{} {}\n", "Error:".red().bold(), error));
        }

        text.push_str(&Self::footer());
        text
    }

    /// Format as JSON
    pub fn format_json(output: &RunAgentOutput) -> String {
        let value = json!({
            "step": output.step,
            "state": output.final_result.state,
            "result": output.final_result.result,
            "success": output.success(),
            "rounds": output.results,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn state(state: AgentState) -> String {
        let label = format!("[{}]", state);
        match state {
            AgentState::InProgress => label.cyan().to_string(),
            AgentState::Completed => label.green().bold().to_string(),
            AgentState::Failed => label.red().bold().to_string(),
            AgentState::Interrupted => label.yellow().bold().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent every line after the first
    fn indent_tail(text: &str, prefix: &str) -> String {
        let mut lines = text.lines();
        let Some(first) = lines.next() else {
            return String::new();
        };
        let mut out = first.to_string();
        for line in lines {
            out.push('\n');
            out.push_str(prefix);
            out.push_str(line);
        }
        out
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, output: &RunAgentOutput) -> String {
        Self::format(output)
    }

    fn format_json(&self, output: &RunAgentOutput) -> String {
        Self::format_json(output)
    }
}
