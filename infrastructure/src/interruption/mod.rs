//! Interruption oracle adapters.

mod registry;

pub use registry::{PlanExecutionState, PlanInterruptionRegistry};
