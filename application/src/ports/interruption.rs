//! Cooperative interruption port.
//!
//! The engine asks [`InterruptionOracle::should_continue`] at fixed
//! checkpoints (before think, before each attempt, before act, before each
//! tool or batch, periodically while waiting for input). Long sleeps also
//! race against [`InterruptionOracle::interrupted`] so a stop request does
//! not have to wait out a backoff.

use async_trait::async_trait;

#[async_trait]
pub trait InterruptionOracle: Send + Sync {
    /// Whether work for `root_plan_id` may continue.
    fn should_continue(&self, root_plan_id: &str) -> bool;

    /// Resolves once `root_plan_id` is interrupted.
    ///
    /// The default never resolves; implementations that can signal push
    /// notifications override it.
    async fn interrupted(&self, _root_plan_id: &str) {
        std::future::pending::<()>().await
    }
}

/// Oracle that never interrupts.
pub struct NeverInterrupt;

impl InterruptionOracle for NeverInterrupt {
    fn should_continue(&self, _root_plan_id: &str) -> bool {
        true
    }
}
