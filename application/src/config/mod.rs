//! Application-level configuration.
//!
//! - [`StepParams`] — retry, wait and loop constants of the step engine

pub mod step_params;

pub use step_params::StepParams;
