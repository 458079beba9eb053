//! Exclusive form slot per root plan and the wait for user input.
//!
//! A root plan and all of its sub-plans share one human-input channel. At
//! most one requester may hold that slot with a form in
//! `AWAITING_USER_INPUT`; a second requester waits for the occupant to
//! resolve (or forces it to time out after the ceiling) before taking over.
//!
//! Every access to the slot map goes through one mutex with a bounded
//! acquisition timeout, so a stuck occupant can delay but never deadlock
//! other plans.

use crate::config::StepParams;
use crate::form_input::FormInputHandle;
use crate::ports::interruption::InterruptionOracle;
use std::collections::HashMap;
use std::time::Duration;
use taskpilot_domain::{FormInputState, UserInputWaitState};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

/// Errors returned to whoever submits user input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UserInputError {
    #[error("No form is waiting for input in plan {0}")]
    NoPendingForm(String),

    #[error("Form for plan {plan_id} is not awaiting input (state: {state})")]
    NotAwaiting { plan_id: String, state: String },

    #[error("Timed out waiting for the form slot lock")]
    LockTimeout,
}

struct FormSlot {
    owner_plan_id: String,
    handle: FormInputHandle,
}

/// Grants exclusive ownership of the form slot of each root plan.
pub struct UserInputWaitCoordinator {
    slots: Mutex<HashMap<String, FormSlot>>,
    lock_timeout: Duration,
    slot_poll_interval: Duration,
    slot_wait_ceiling: Duration,
    input_poll_interval: Duration,
    interruption_check_interval: Duration,
}

impl Default for UserInputWaitCoordinator {
    fn default() -> Self {
        Self::from_params(&StepParams::default())
    }
}

impl UserInputWaitCoordinator {
    pub fn from_params(params: &StepParams) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            lock_timeout: params.form_lock_timeout,
            slot_poll_interval: params.slot_poll_interval,
            slot_wait_ceiling: params.slot_wait_ceiling,
            input_poll_interval: params.input_poll_interval,
            interruption_check_interval: params.interruption_check_interval,
        }
    }

    async fn lock_slots(&self) -> Option<MutexGuard<'_, HashMap<String, FormSlot>>> {
        match timeout(self.lock_timeout, self.slots.lock()).await {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!(
                    "Timed out after {:?} waiting for the form slot lock",
                    self.lock_timeout
                );
                None
            }
        }
    }

    /// Install `handle` as the form slot occupant for `root_plan_id`.
    ///
    /// Returns false only when the slot lock could not be taken in time.
    /// If another requester's form is still awaiting input, this waits for
    /// it to resolve, forcing it to `INPUT_TIMEOUT` once the ceiling passes.
    pub async fn acquire_form_slot(
        &self,
        root_plan_id: &str,
        handle: &FormInputHandle,
        requester_plan_id: &str,
    ) -> bool {
        let deadline = Instant::now() + self.slot_wait_ceiling;

        loop {
            let Some(mut slots) = self.lock_slots().await else {
                return false;
            };

            let blocking = slots.get(root_plan_id).and_then(|slot| {
                let busy = slot.owner_plan_id != requester_plan_id
                    && !slot.handle.same_instance(handle)
                    && slot.handle.is_awaiting();
                busy.then(|| (slot.owner_plan_id.clone(), slot.handle.clone()))
            });

            match blocking {
                Some((occupant_plan_id, occupant)) => {
                    drop(slots);
                    info!(
                        "Plan {} waiting for form slot of root {} held by {}",
                        requester_plan_id, root_plan_id, occupant_plan_id
                    );
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if !self.wait_until_resolved(&occupant, remaining).await {
                        warn!(
                            "Form of plan {} still awaiting input after {:?}; forcing timeout",
                            occupant_plan_id, self.slot_wait_ceiling
                        );
                        occupant.mark_timeout();
                    }
                }
                None => {
                    if let Some(previous) = slots.insert(
                        root_plan_id.to_string(),
                        FormSlot {
                            owner_plan_id: requester_plan_id.to_string(),
                            handle: handle.clone(),
                        },
                    ) {
                        debug!(
                            "Evicted form slot occupant {} of root {}",
                            previous.owner_plan_id, root_plan_id
                        );
                    }
                    info!(
                        "Plan {} holds the form slot of root {}",
                        requester_plan_id, root_plan_id
                    );
                    return true;
                }
            }
        }
    }

    /// Poll `occupant` until it leaves `AWAITING_USER_INPUT` or `limit` passes.
    async fn wait_until_resolved(&self, occupant: &FormInputHandle, limit: Duration) -> bool {
        let mut rx = occupant.subscribe();
        let wait = async {
            while occupant.is_awaiting() {
                tokio::select! {
                    _ = rx.changed() => {}
                    _ = sleep(self.slot_poll_interval) => {}
                }
            }
        };
        timeout(limit, wait).await.is_ok()
    }

    /// Wait for the user to answer the form held by `handle`.
    ///
    /// The state is polled every `input_poll_interval` and the interruption
    /// oracle every `interruption_check_interval`. On timeout or interruption
    /// the form is forced to `INPUT_TIMEOUT`.
    pub async fn wait_for_user_input(
        &self,
        handle: &FormInputHandle,
        root_plan_id: &str,
        oracle: &dyn InterruptionOracle,
        input_timeout: Duration,
    ) -> FormInputState {
        let started = Instant::now();
        let mut last_check = started;
        let mut rx = handle.subscribe();

        while handle.is_awaiting() {
            if started.elapsed() >= input_timeout {
                info!(
                    "No user input for root {} within {:?}",
                    root_plan_id, input_timeout
                );
                handle.mark_timeout();
                break;
            }
            if last_check.elapsed() >= self.interruption_check_interval {
                last_check = Instant::now();
                if !oracle.should_continue(root_plan_id) {
                    info!("Input wait for root {} interrupted", root_plan_id);
                    handle.mark_timeout();
                    break;
                }
            }
            tokio::select! {
                _ = rx.changed() => {}
                _ = sleep(self.input_poll_interval) => {}
            }
        }

        handle.state().unwrap_or(FormInputState::InputTimeout)
    }

    /// Remove the slot of `root_plan_id` unconditionally.
    pub async fn release(&self, root_plan_id: &str) {
        if let Some(mut slots) = self.lock_slots().await
            && slots.remove(root_plan_id).is_some()
        {
            debug!("Released form slot of root {}", root_plan_id);
        }
    }

    /// Remove the slot only if `plan_id` currently owns it.
    pub async fn release_owned_by(&self, root_plan_id: &str, plan_id: &str) {
        if let Some(mut slots) = self.lock_slots().await
            && slots
                .get(root_plan_id)
                .is_some_and(|slot| slot.owner_plan_id == plan_id)
        {
            slots.remove(root_plan_id);
            debug!("Plan {} released form slot of root {}", plan_id, root_plan_id);
        }
    }

    /// Remove the slot only if it still holds `handle`.
    pub async fn release_handle(&self, root_plan_id: &str, handle: &FormInputHandle) {
        if let Some(mut slots) = self.lock_slots().await
            && slots
                .get(root_plan_id)
                .is_some_and(|slot| slot.handle.same_instance(handle))
        {
            slots.remove(root_plan_id);
            debug!("Released form slot of root {}", root_plan_id);
        }
    }

    /// Plan id of the occupant whose form is awaiting input, if any.
    pub async fn awaiting_occupant(&self, root_plan_id: &str) -> Option<String> {
        let slots = self.lock_slots().await?;
        slots
            .get(root_plan_id)
            .filter(|slot| slot.handle.is_awaiting())
            .map(|slot| slot.owner_plan_id.clone())
    }

    /// Form currently held for `root_plan_id`, for display to the user.
    pub async fn wait_state(&self, root_plan_id: &str) -> Option<UserInputWaitState> {
        let slots = self.lock_slots().await?;
        let slot = slots.get(root_plan_id)?;
        slot.handle.wait_state(&slot.owner_plan_id)
    }

    /// Deliver user answers to the form waiting in `root_plan_id`.
    pub async fn submit_user_inputs(
        &self,
        root_plan_id: &str,
        values: &[(String, String)],
    ) -> Result<(), UserInputError> {
        let slots = self.lock_slots().await.ok_or(UserInputError::LockTimeout)?;
        let slot = slots
            .get(root_plan_id)
            .ok_or_else(|| UserInputError::NoPendingForm(root_plan_id.to_string()))?;

        let accepted = slot
            .handle
            .submit(values.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if !accepted {
            return Err(UserInputError::NotAwaiting {
                plan_id: slot.owner_plan_id.clone(),
                state: slot
                    .handle
                    .state()
                    .map_or_else(|| "NONE".to_string(), |s| s.to_string()),
            });
        }
        info!(
            "User input submitted for plan {} (root {})",
            slot.owner_plan_id, root_plan_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::interruption::NeverInterrupt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use taskpilot_domain::{InputItem, UserFormInput};

    fn open_form(title: &str) -> FormInputHandle {
        let handle = FormInputHandle::new();
        handle.begin(UserFormInput {
            title: title.to_string(),
            description: String::new(),
            inputs: vec![InputItem::new("answer", "Answer")],
        });
        handle
    }

    struct StopAfterFlag(AtomicBool);

    impl InterruptionOracle for StopAfterFlag {
        fn should_continue(&self, _root_plan_id: &str) -> bool {
            !self.0.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_acquire_empty_slot() {
        let coordinator = UserInputWaitCoordinator::default();
        let form = open_form("a");
        assert!(coordinator.acquire_form_slot("root", &form, "sub-1").await);
        assert_eq!(
            coordinator.awaiting_occupant("root").await.as_deref(),
            Some("sub-1")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_requester_waits_for_occupant() {
        let coordinator = Arc::new(UserInputWaitCoordinator::default());
        let first = open_form("first");
        assert!(coordinator.acquire_form_slot("root", &first, "sub-1").await);

        let second = open_form("second");
        let contender = {
            let coordinator = coordinator.clone();
            let second = second.clone();
            tokio::spawn(async move { coordinator.acquire_form_slot("root", &second, "sub-2").await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!contender.is_finished());
        assert_eq!(
            coordinator.awaiting_occupant("root").await.as_deref(),
            Some("sub-1")
        );

        assert!(first.submit([("answer", "yes")]));
        assert!(contender.await.unwrap());
        assert_eq!(
            coordinator.awaiting_occupant("root").await.as_deref(),
            Some("sub-2")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requesters_never_share_the_slot() {
        let coordinator = Arc::new(UserInputWaitCoordinator::default());
        let a = open_form("a");
        let b = open_form("b");

        let task_a = {
            let (coordinator, a) = (coordinator.clone(), a.clone());
            tokio::spawn(async move { coordinator.acquire_form_slot("root", &a, "sub-a").await })
        };
        let task_b = {
            let (coordinator, b) = (coordinator.clone(), b.clone());
            tokio::spawn(async move { coordinator.acquire_form_slot("root", &b, "sub-b").await })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        let holder = coordinator.awaiting_occupant("root").await.unwrap();
        let (winner, loser_task, winner_form) = if holder == "sub-a" {
            ("sub-a", task_b, a.clone())
        } else {
            ("sub-b", task_a, b.clone())
        };
        assert!(!loser_task.is_finished(), "{winner} should block the other requester");

        winner_form.mark_timeout();
        assert!(loser_task.await.unwrap());
        let new_holder = coordinator.awaiting_occupant("root").await.unwrap();
        assert_ne!(new_holder, winner);
    }

    #[tokio::test(start_paused = true)]
    async fn test_occupant_forced_to_timeout_after_ceiling() {
        let params = StepParams::default()
            .with_slot_wait(Duration::from_millis(100), Duration::from_secs(3));
        let coordinator = UserInputWaitCoordinator::from_params(&params);
        let stuck = open_form("stuck");
        assert!(coordinator.acquire_form_slot("root", &stuck, "sub-1").await);

        let next = open_form("next");
        assert!(coordinator.acquire_form_slot("root", &next, "sub-2").await);
        assert_eq!(stuck.state(), Some(FormInputState::InputTimeout));
        assert_eq!(
            coordinator.awaiting_occupant("root").await.as_deref(),
            Some("sub-2")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_fails_when_lock_is_held() {
        let coordinator = UserInputWaitCoordinator::default();
        let _guard = coordinator.slots.lock().await;
        let form = open_form("a");
        assert!(!coordinator.acquire_form_slot("root", &form, "sub-1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_input_received() {
        let coordinator = Arc::new(UserInputWaitCoordinator::default());
        let form = open_form("a");
        assert!(coordinator.acquire_form_slot("root", &form, "root").await);

        let submitter = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            submitter
                .submit_user_inputs("root", &[("answer".to_string(), "42".to_string())])
                .await
                .unwrap();
        });

        let state = coordinator
            .wait_for_user_input(&form, "root", &NeverInterrupt, Duration::from_secs(60))
            .await;
        assert_eq!(state, FormInputState::InputReceived);
        assert_eq!(form.form().unwrap().inputs[0].value.as_deref(), Some("42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_exactly_once() {
        let coordinator = UserInputWaitCoordinator::default();
        let form = open_form("a");
        let mut rx = form.subscribe();

        let state = coordinator
            .wait_for_user_input(&form, "root", &NeverInterrupt, Duration::from_secs(5))
            .await;
        assert_eq!(state, FormInputState::InputTimeout);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!form.mark_timeout());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_interrupted_counts_as_timeout() {
        let coordinator = UserInputWaitCoordinator::default();
        let form = open_form("a");
        let oracle = StopAfterFlag(AtomicBool::new(true));

        let started = Instant::now();
        let state = coordinator
            .wait_for_user_input(&form, "root", &oracle, Duration::from_secs(300))
            .await;
        assert_eq!(state, FormInputState::InputTimeout);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_submit_errors() {
        let coordinator = UserInputWaitCoordinator::default();
        let err = coordinator.submit_user_inputs("missing", &[]).await.unwrap_err();
        assert_eq!(err, UserInputError::NoPendingForm("missing".to_string()));

        let form = open_form("a");
        assert!(coordinator.acquire_form_slot("root", &form, "root").await);
        form.mark_timeout();
        let err = coordinator.submit_user_inputs("root", &[]).await.unwrap_err();
        assert!(matches!(err, UserInputError::NotAwaiting { .. }));
    }

    #[tokio::test]
    async fn test_release_variants() {
        let coordinator = UserInputWaitCoordinator::default();
        let form = open_form("a");
        assert!(coordinator.acquire_form_slot("root", &form, "sub-1").await);

        coordinator.release_owned_by("root", "sub-2").await;
        assert!(coordinator.wait_state("root").await.is_some());

        coordinator.release_handle("root", &open_form("other")).await;
        assert!(coordinator.wait_state("root").await.is_some());

        coordinator.release_owned_by("root", "sub-1").await;
        assert!(coordinator.wait_state("root").await.is_none());

        assert!(coordinator.acquire_form_slot("root", &form, "sub-1").await);
        coordinator.release("root").await;
        assert!(coordinator.awaiting_occupant("root").await.is_none());
    }
}
