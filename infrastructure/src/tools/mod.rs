//! Built-in tools and the tool registry

mod error_report;
mod form_input;
mod registry;
mod terminate;
mod uuid_generate;

pub use error_report::{ERROR_REPORT, ErrorReportTool};
pub use form_input::{FORM_INPUT, FormInputTool};
pub use registry::ToolRegistry;
pub use terminate::{TERMINATE, TerminateTool};
pub use uuid_generate::{UUID_GENERATE, UuidGenerateTool};
