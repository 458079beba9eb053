//! Presentation layer for taskpilot
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive form prompt.

pub mod cli;
pub mod form;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, RunArgs};
pub use form::prompt::FormPrompter;
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{FormRequest, ProgressReporter, SimpleProgress};
