//! Shared utilities for use cases.
//!
//! Interruption checkpoints and interruptible sleeps used by the think and
//! act phases.

use crate::ports::interruption::InterruptionOracle;
use crate::use_cases::run_step::StepError;
use std::time::Duration;

/// Return `Err(StepError::Interrupted)` if the root plan was told to stop.
pub(crate) fn check_interrupted(
    oracle: &dyn InterruptionOracle,
    root_plan_id: &str,
) -> Result<(), StepError> {
    if oracle.should_continue(root_plan_id) {
        Ok(())
    } else {
        Err(StepError::Interrupted)
    }
}

/// Sleep for `delay` unless the root plan is interrupted first.
pub(crate) async fn sleep_unless_interrupted(
    oracle: &dyn InterruptionOracle,
    root_plan_id: &str,
    delay: Duration,
) -> Result<(), StepError> {
    tokio::select! {
        biased;
        _ = oracle.interrupted(root_plan_id) => Err(StepError::Interrupted),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
