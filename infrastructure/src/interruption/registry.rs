//! Desired execution state per root plan.
//!
//! Controllers (a CLI signal handler, a UI button) set the state; the step
//! engine reads it through [`InterruptionOracle`]. Each root plan owns a
//! [`CancellationToken`] that is cancelled whenever the state leaves `Run`,
//! waking any backoff sleep or LLM stream racing against it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use taskpilot_application::InterruptionOracle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What a controller wants a root plan to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanExecutionState {
    #[default]
    Run,
    Pause,
    Stop,
    Cancel,
}

impl PlanExecutionState {
    pub fn interrupts(&self) -> bool {
        !matches!(self, PlanExecutionState::Run)
    }
}

impl fmt::Display for PlanExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanExecutionState::Run => "run",
            PlanExecutionState::Pause => "pause",
            PlanExecutionState::Stop => "stop",
            PlanExecutionState::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

struct Entry {
    state: PlanExecutionState,
    token: CancellationToken,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            state: PlanExecutionState::Run,
            token: CancellationToken::new(),
        }
    }
}

/// [`InterruptionOracle`] backed by a per-root-plan state map.
#[derive(Default)]
pub struct PlanInterruptionRegistry {
    plans: Mutex<HashMap<String, Entry>>,
}

impl PlanInterruptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the desired state of `root_plan_id`.
    ///
    /// Leaving `Run` cancels the plan's token; returning to `Run` installs a
    /// fresh one.
    pub fn set_state(&self, root_plan_id: &str, state: PlanExecutionState) {
        let Ok(mut plans) = self.plans.lock() else {
            warn!("Interruption registry lock poisoned; ignoring {} for {}", state, root_plan_id);
            return;
        };
        let entry = plans.entry(root_plan_id.to_string()).or_default();
        if entry.state == state {
            return;
        }
        info!("Root plan {}: {} -> {}", root_plan_id, entry.state, state);
        entry.state = state;
        if state.interrupts() {
            entry.token.cancel();
        } else if entry.token.is_cancelled() {
            entry.token = CancellationToken::new();
        }
    }

    pub fn state(&self, root_plan_id: &str) -> PlanExecutionState {
        self.plans
            .lock()
            .ok()
            .and_then(|plans| plans.get(root_plan_id).map(|e| e.state))
            .unwrap_or_default()
    }

    /// Forget `root_plan_id` once its run is over.
    pub fn remove(&self, root_plan_id: &str) {
        if let Ok(mut plans) = self.plans.lock() {
            plans.remove(root_plan_id);
        }
    }

    fn token(&self, root_plan_id: &str) -> Option<CancellationToken> {
        let mut plans = self.plans.lock().ok()?;
        Some(plans.entry(root_plan_id.to_string()).or_default().token.clone())
    }
}

#[async_trait]
impl InterruptionOracle for PlanInterruptionRegistry {
    fn should_continue(&self, root_plan_id: &str) -> bool {
        !self.state(root_plan_id).interrupts()
    }

    async fn interrupted(&self, root_plan_id: &str) {
        match self.token(root_plan_id) {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    }
}
