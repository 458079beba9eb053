//! Shared state of a form-input tool instance.
//!
//! The tool side opens a form with [`FormInputHandle::begin`]; the engine
//! waits on the handle, and whoever serves the user (CLI, HTTP, tests)
//! resolves it with [`FormInputHandle::submit`]. A `watch` channel carries
//! the state so waiters wake on change instead of only on their poll tick.

use std::sync::{Arc, Mutex, MutexGuard};
use taskpilot_domain::{FormInputState, UserFormInput, UserInputWaitState};
use tokio::sync::watch;

struct Inner {
    state: watch::Sender<Option<FormInputState>>,
    form: Mutex<Option<UserFormInput>>,
    owner_plan_id: Mutex<Option<String>>,
}

/// Cloneable handle to one form-input tool's state.
#[derive(Clone)]
pub struct FormInputHandle {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for FormInputHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormInputHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormInputHandle")
            .field("state", &self.state())
            .field("owner", &self.owner())
            .finish()
    }
}

impl FormInputHandle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                state,
                form: Mutex::new(None),
                owner_plan_id: Mutex::new(None),
            }),
        }
    }

    /// Open a new form cycle in `AwaitingUserInput`.
    pub fn begin(&self, form: UserFormInput) {
        *lock(&self.inner.form) = Some(form);
        self.inner
            .state
            .send_replace(Some(FormInputState::AwaitingUserInput));
    }

    /// Current state; `None` before the first form is opened.
    pub fn state(&self) -> Option<FormInputState> {
        *self.inner.state.borrow()
    }

    pub fn is_awaiting(&self) -> bool {
        self.state().is_some_and(|s| s.is_awaiting())
    }

    pub fn form(&self) -> Option<UserFormInput> {
        lock(&self.inner.form).clone()
    }

    pub fn set_owner(&self, plan_id: impl Into<String>) {
        *lock(&self.inner.owner_plan_id) = Some(plan_id.into());
    }

    pub fn owner(&self) -> Option<String> {
        lock(&self.inner.owner_plan_id).clone()
    }

    /// Fill the form and move it to `InputReceived`.
    ///
    /// Returns false (and changes nothing) unless the form is awaiting input.
    pub fn submit<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = lock(&self.inner.form);
        let accepted = self.inner.state.send_if_modified(|state| {
            if matches!(state, Some(FormInputState::AwaitingUserInput)) {
                *state = Some(FormInputState::InputReceived);
                true
            } else {
                false
            }
        });
        if accepted && let Some(form) = form.as_mut() {
            form.apply_values(values);
        }
        accepted
    }

    /// Move an awaiting form to `InputTimeout`.
    ///
    /// Returns true only for the call that performed the transition.
    pub fn mark_timeout(&self) -> bool {
        self.inner.state.send_if_modified(|state| {
            if matches!(state, Some(FormInputState::AwaitingUserInput)) {
                *state = Some(FormInputState::InputTimeout);
                true
            } else {
                false
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<FormInputState>> {
        self.inner.state.subscribe()
    }

    /// Forget the current form and owner.
    pub fn reset(&self) {
        *lock(&self.inner.form) = None;
        *lock(&self.inner.owner_plan_id) = None;
        self.inner.state.send_replace(None);
    }

    /// Whether both handles refer to the same tool instance.
    pub fn same_instance(&self, other: &FormInputHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Human-readable state used in tool output, memory and prompts.
    pub fn describe(&self) -> String {
        let state = match self.state() {
            Some(state) => state.to_string(),
            None => return "No form requested".to_string(),
        };
        let Some(form) = self.form() else {
            return format!("State: {}", state);
        };

        let mut out = format!("Form: {}\nState: {}", form.title, state);
        if !form.description.is_empty() {
            out.push_str(&format!("\nDescription: {}", form.description));
        }
        for item in &form.inputs {
            let value = item.value.as_deref().unwrap_or("");
            out.push_str(&format!("\n- {} ({}): {}", item.label, item.name, value));
        }
        out
    }

    pub fn wait_state(&self, plan_id: impl Into<String>) -> Option<UserInputWaitState> {
        let form = self.form()?;
        Some(UserInputWaitState {
            plan_id: plan_id.into(),
            title: form.title,
            form_description: form.description,
            form_inputs: form.inputs,
            waiting: self.is_awaiting(),
        })
    }
}
