//! Run Agent use case
//!
//! Drives [`StepExecutor::step`] until the step reaches a terminal state or
//! the step budget runs out, then releases the plan's resources.

use crate::ports::llm_gateway::LlmClient;
use crate::use_cases::run_step::StepExecutor;
use taskpilot_domain::{AgentExecResult, AgentState, AgentStep, DomainError};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur before the run starts
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error(transparent)]
    InvalidStep(#[from] DomainError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Input for the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    pub step: AgentStep,
}

impl RunAgentInput {
    pub fn new(step: AgentStep) -> Self {
        Self { step }
    }

    /// Root-level step for a fresh plan.
    pub fn for_requirement(
        plan_id: impl Into<String>,
        step_id: impl Into<String>,
        requirement: impl Into<String>,
    ) -> Self {
        let plan_id = plan_id.into();
        Self {
            step: AgentStep::new(step_id, plan_id.clone(), plan_id).with_requirement(requirement),
        }
    }
}

/// Output from the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentOutput {
    /// The step as it ended, including any recorded error message
    pub step: AgentStep,
    /// Result of every `step()` call, in order
    pub results: Vec<AgentExecResult>,
    /// The result that ended the run
    pub final_result: AgentExecResult,
}

impl RunAgentOutput {
    pub fn state(&self) -> AgentState {
        self.final_result.state
    }

    pub fn success(&self) -> bool {
        self.final_result.state == AgentState::Completed && self.step.error_message.is_none()
    }
}

/// Use case for running an agent step to completion
pub struct RunAgentUseCase<G: LlmClient + 'static> {
    executor: StepExecutor<G>,
}

impl<G: LlmClient + 'static> RunAgentUseCase<G> {
    pub fn new(executor: StepExecutor<G>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &StepExecutor<G> {
        &self.executor
    }

    pub async fn execute(&self, input: RunAgentInput) -> Result<RunAgentOutput, RunAgentError> {
        let max_steps = self.executor.params().max_steps;
        if max_steps == 0 {
            return Err(RunAgentError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }

        let mut step = input.step;
        step.validate()?;
        info!(
            "Running step {} of plan {} (root {}, depth {})",
            step.step_id, step.current_plan_id, step.root_plan_id, step.plan_depth
        );

        let mut results = Vec::new();
        let mut final_result = None;
        for round in 1..=max_steps {
            let result = self.executor.step(&mut step).await;
            results.push(result.clone());
            if result.is_terminal() {
                info!("Step {} ended after {} rounds: {}", step.step_id, round, result.state);
                final_result = Some(result);
                break;
            }
        }

        let final_result = final_result.unwrap_or_else(|| {
            warn!("Step {} reached max steps ({})", step.step_id, max_steps);
            AgentExecResult::completed(format!("Terminated: Reached max steps ({})", max_steps))
        });

        self.executor.clear_up(&step).await;

        Ok(RunAgentOutput {
            step,
            results,
            final_result,
        })
    }
}
