//! Progress reporting for step execution

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use taskpilot_application::StepProgressNotifier;
use taskpilot_domain::{AgentExecResult, AgentState, AgentStep, UserFormInput, preview};
use tokio::sync::mpsc;

/// A form the engine is waiting on, handed to the form prompter.
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub root_plan_id: String,
    pub form: UserFormInput,
}

/// Reports progress during step execution with a spinner
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    forms: Option<mpsc::UnboundedSender<FormRequest>>,
    verbose: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            forms: None,
            verbose: false,
        }
    }

    /// Print every tool call and model output, not just the spinner
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Forward waiting forms to a prompter
    pub fn with_form_channel(mut self, forms: mpsc::UnboundedSender<FormRequest>) -> Self {
        self.forms = Some(forms);
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn set_message(&self, message: String) {
        if let Ok(guard) = self.spinner.lock()
            && let Some(pb) = guard.as_ref()
        {
            pb.set_message(message);
        }
    }

    fn println(&self, line: String) {
        match self.spinner.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => pb.println(line),
                None => eprintln!("{}", line),
            },
            Err(_) => eprintln!("{}", line),
        }
    }

    fn finish(&self) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }

    fn state_label(state: AgentState) -> colored::ColoredString {
        match state {
            AgentState::InProgress => state.as_str().cyan(),
            AgentState::Completed => state.as_str().green().bold(),
            AgentState::Failed => state.as_str().red().bold(),
            AgentState::Interrupted => state.as_str().yellow().bold(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StepProgressNotifier for ProgressReporter {
    fn on_think_start(&self, step: &AgentStep, attempt: u32) {
        let Ok(mut guard) = self.spinner.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        pb.set_prefix(step.step_id.clone());
        if attempt > 1 {
            pb.set_message(format!("Thinking (attempt {})", attempt));
        } else {
            pb.set_message("Thinking...");
        }
    }

    fn on_llm_chunk(&self, chunk: &str) {
        if !chunk.trim().is_empty() {
            self.set_message(format!("Thinking: {}", preview(chunk.trim(), 50)));
        }
    }

    fn on_retry_scheduled(&self, attempt: u32, delay: Duration, error: &str) {
        self.println(format!(
            "  {} attempt {} failed: {} (retrying in {:?})",
            "!".yellow(),
            attempt,
            preview(error, 80).dimmed(),
            delay
        ));
    }

    fn on_retry_succeeded(&self, plan_id: &str, attempt: u32) {
        if self.verbose {
            self.println(format!(
                "  {} plan {} recovered on attempt {}",
                "✓".green(),
                plan_id,
                attempt
            ));
        }
    }

    fn on_tool_call(&self, tool_name: &str, args: &str) {
        self.set_message(format!("Running: {}", tool_name));
        if self.verbose {
            self.println(format!(
                "  {} {} {}",
                "🔧".dimmed(),
                tool_name.cyan(),
                preview(args, 60).dimmed()
            ));
        }
    }

    fn on_tool_result(&self, tool_name: &str, success: bool) {
        if !self.verbose {
            return;
        }
        if success {
            self.println(format!("  {} {}", "✓".green(), tool_name.green()));
        } else {
            self.println(format!("  {} {} {}", "✗".red(), tool_name.red(), "FAILED".dimmed()));
        }
    }

    fn on_waiting_for_input(&self, root_plan_id: &str, form: &UserFormInput) {
        self.finish();
        if let Some(forms) = &self.forms {
            let _ = forms.send(FormRequest {
                root_plan_id: root_plan_id.to_string(),
                form: form.clone(),
            });
        } else {
            eprintln!(
                "{} Form '{}' is waiting for input but no prompter is attached",
                "!".yellow(),
                form.title
            );
        }
    }

    fn on_step_finished(&self, step: &AgentStep, result: &AgentExecResult) {
        if result.is_terminal() {
            self.finish();
        }
        if self.verbose || result.is_terminal() {
            self.println(format!(
                "{} {} {}",
                step.step_id.bold(),
                Self::state_label(result.state),
                preview(&result.result, 100)
            ));
        }
    }
}

/// Plain line-per-event progress (no spinner)
pub struct SimpleProgress;

impl StepProgressNotifier for SimpleProgress {
    fn on_think_start(&self, step: &AgentStep, attempt: u32) {
        println!("{} {} think #{}", "->".cyan(), step.step_id.bold(), attempt);
    }

    fn on_retry_scheduled(&self, attempt: u32, delay: Duration, error: &str) {
        println!("  {} attempt {} failed, retrying in {:?}: {}", "!".yellow(), attempt, delay, error);
    }

    fn on_tool_call(&self, tool_name: &str, _args: &str) {
        println!("  {} {}", "🔧".dimmed(), tool_name);
    }

    fn on_tool_result(&self, tool_name: &str, success: bool) {
        if success {
            println!("  {} {}", "v".green(), tool_name);
        } else {
            println!("  {} {} (failed)", "x".red(), tool_name);
        }
    }

    fn on_step_finished(&self, _step: &AgentStep, result: &AgentExecResult) {
        println!("  = {} {}", result.state, preview(&result.result, 100));
    }
}
