//! Output formatter trait

use taskpilot_application::RunAgentOutput;

/// Trait for formatting run results
pub trait OutputFormatter {
    /// Human-readable summary
    fn format(&self, output: &RunAgentOutput) -> String;

    /// Format as JSON
    fn format_json(&self, output: &RunAgentOutput) -> String;
}
