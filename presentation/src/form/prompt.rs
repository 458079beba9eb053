//! Interactive form prompt.
//!
//! When a step opens a form, the user sees:
//!
//! ```text
//! ═══════════════════════════════════════════════════════════════
//!   📝 Deploy target
//! ═══════════════════════════════════════════════════════════════
//! Which environment should be deployed?
//!
//! Environment [staging/prod] *: prod
//! ```
//!
//! Answers given on the command line (`--answer env=prod`) are submitted
//! without prompting. Without a terminal and without preset answers the form
//! is left alone and times out on the engine side.

use colored::Colorize;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use taskpilot_application::{UserInputError, UserInputWaitCoordinator};
use taskpilot_domain::{InputItem, UserFormInput};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::progress::reporter::FormRequest;

const SUBMIT_ATTEMPTS: u32 = 50;
const SUBMIT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Answers forms from preset values or from stdin.
pub struct FormPrompter {
    coordinator: Arc<UserInputWaitCoordinator>,
    answers: HashMap<String, String>,
    interactive: bool,
}

impl FormPrompter {
    pub fn new(coordinator: Arc<UserInputWaitCoordinator>) -> Self {
        Self {
            coordinator,
            answers: HashMap::new(),
            interactive: true,
        }
    }

    pub fn with_answers(mut self, answers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.answers.extend(answers);
        self
    }

    /// Never read from stdin
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Preset answers for `form`, if they cover every required field.
    pub fn preset_answers(&self, form: &UserFormInput) -> Option<Vec<(String, String)>> {
        let values: Vec<(String, String)> = form
            .inputs
            .iter()
            .filter_map(|item| {
                self.answers
                    .get(&item.name)
                    .map(|value| (item.name.clone(), value.clone()))
            })
            .collect();
        let covered = form
            .inputs
            .iter()
            .filter(|item| item.required)
            .all(|item| self.answers.contains_key(&item.name));
        (covered && !values.is_empty()).then_some(values)
    }

    /// Handle form requests until the channel closes.
    pub async fn run(self, mut requests: mpsc::UnboundedReceiver<FormRequest>) {
        while let Some(request) = requests.recv().await {
            self.handle(request).await;
        }
    }

    async fn handle(&self, request: FormRequest) {
        let values = match self.preset_answers(&request.form) {
            Some(values) => values,
            None if self.interactive => {
                let form = request.form.clone();
                match tokio::task::spawn_blocking(move || read_form(&form)).await {
                    Ok(Ok(values)) => values,
                    Ok(Err(e)) => {
                        warn!("Failed to read form input: {}", e);
                        return;
                    }
                    Err(e) => {
                        warn!("Form prompt task failed: {}", e);
                        return;
                    }
                }
            }
            None => {
                println!(
                    "{} Form '{}' needs input; no answers given, it will time out",
                    "!".yellow(),
                    request.form.title
                );
                return;
            }
        };

        match self.submit(&request.root_plan_id, &values).await {
            Ok(()) => println!("{}", "✓ Form submitted".green()),
            Err(e) => println!("{} {}", "✗".red(), e),
        }
    }

    /// Submit, waiting briefly for the engine to take the form slot.
    async fn submit(
        &self,
        root_plan_id: &str,
        values: &[(String, String)],
    ) -> Result<(), UserInputError> {
        let mut attempt = 1;
        loop {
            match self.coordinator.submit_user_inputs(root_plan_id, values).await {
                Err(UserInputError::NoPendingForm(_) | UserInputError::LockTimeout)
                    if attempt < SUBMIT_ATTEMPTS =>
                {
                    debug!("Form slot for {} not ready (attempt {})", root_plan_id, attempt);
                    attempt += 1;
                    tokio::time::sleep(SUBMIT_RETRY_DELAY).await;
                }
                other => return other,
            }
        }
    }
}

fn header(title: &str) {
    let line = "═".repeat(63);
    println!();
    println!("{}", line.cyan().bold());
    println!("  📝 {}", title.bold());
    println!("{}", line.cyan().bold());
}

fn field_prompt(item: &InputItem) -> String {
    let label = if item.label.is_empty() {
        item.name.as_str()
    } else {
        item.label.as_str()
    };
    let mut prompt = label.to_string();
    if !item.options.is_empty() {
        prompt.push_str(&format!(" [{}]", item.options.join("/")));
    }
    if let Some(placeholder) = &item.placeholder {
        prompt.push_str(&format!(" ({})", placeholder));
    }
    if item.required {
        prompt.push_str(" *");
    }
    prompt
}

fn read_form(form: &UserFormInput) -> io::Result<Vec<(String, String)>> {
    header(&form.title);
    if !form.description.is_empty() {
        println!("{}", form.description);
    }
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut values = Vec::with_capacity(form.inputs.len());
    for item in &form.inputs {
        loop {
            print!("{}: ", field_prompt(item).cyan());
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(values);
            };
            let answer = line?.trim().to_string();
            if answer.is_empty() && item.required {
                println!("{}", "This field is required.".yellow());
                continue;
            }
            if !answer.is_empty() {
                values.push((item.name.clone(), answer));
            }
            break;
        }
    }
    Ok(values)
}
