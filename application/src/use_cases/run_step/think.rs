//! Think phase: ask the model for tool calls, retrying transient failures.

use super::StepExecutor;
use super::types::{StepError, ThinkOutcome, ThinkProposal};
use crate::ports::llm_gateway::{GatewayError, LlmClient, LlmRequest, RequestMetadata};
use crate::use_cases::shared::{check_interrupted, sleep_unless_interrupted};
use std::collections::BTreeMap;
use taskpilot_domain::util::{new_think_act_id, new_tool_call_id};
use taskpilot_domain::{
    ActToolParam, AgentPromptTemplate, AgentStep, LlmResponse, Message, RetryContext,
    RetryPolicy, SystemInfo, ThinkActRecord,
};
use tracing::{debug, info, warn};

/// Prompt assembled for one think attempt.
struct ThinkPrompt {
    messages: Vec<Message>,
    history: Vec<Message>,
    think_input: String,
}

impl<G: LlmClient + 'static> StepExecutor<G> {
    /// Ask the model what to do next.
    ///
    /// Answers without tool calls use up an attempt without backoff. Failed
    /// calls are collected in the returned context; a non-retryable one ends
    /// the loop at once.
    pub(super) async fn think(&self, step: &AgentStep) -> Result<ThinkOutcome, StepError> {
        let policy = self.params.retry_policy();
        let mut retry = RetryContext::new();

        for attempt in 1..=policy.max_attempts {
            check_interrupted(&*self.interruption, &step.root_plan_id)?;
            self.progress.on_think_start(step, attempt);

            let prompt = self.build_prompt(step);
            let tool_call_id = new_tool_call_id();
            debug!(
                "Think attempt {}/{} for step {} ({})",
                attempt, policy.max_attempts, step.step_id, tool_call_id
            );

            let response = tokio::select! {
                biased;
                _ = self.interruption.interrupted(&step.root_plan_id) => {
                    return Err(StepError::Interrupted);
                }
                response = self.request(step, &prompt, &tool_call_id) => response,
            };

            match response {
                Ok(response) if response.has_tool_calls() => {
                    let proposal = ThinkProposal {
                        calls: response.tool_calls(),
                        think_output: response.text_content(),
                        think_input: prompt.think_input,
                        tool_call_id,
                        history: prompt.history,
                    };
                    self.record_think(step, &proposal);
                    if attempt > 1 {
                        info!(
                            "Think for plan {} succeeded on attempt {}",
                            step.current_plan_id, attempt
                        );
                        self.progress
                            .on_retry_succeeded(&step.current_plan_id, attempt);
                    }
                    return Ok(ThinkOutcome::Proposed(proposal));
                }
                Ok(_) => {
                    warn!(
                        "Attempt {}/{}: model proposed no tool calls for step {}",
                        attempt, policy.max_attempts, step.step_id
                    );
                }
                Err(e) => {
                    let failure = e.to_failure();
                    let retryable = failure.is_retryable();
                    retry.record(failure);
                    if !retryable {
                        warn!("Non-retryable LLM error for step {}: {}", step.step_id, e);
                        return Ok(ThinkOutcome::Failed(retry));
                    }
                    if attempt < policy.max_attempts {
                        self.back_off(step, &policy, attempt, &e).await?;
                    } else {
                        warn!(
                            "LLM call failed on final attempt {} for step {}: {}",
                            attempt, step.step_id, e
                        );
                    }
                }
            }
        }

        if retry.is_empty() {
            Ok(ThinkOutcome::NoAction)
        } else {
            Ok(ThinkOutcome::Failed(retry))
        }
    }

    async fn back_off(
        &self,
        step: &AgentStep,
        policy: &RetryPolicy,
        attempt: u32,
        error: &GatewayError,
    ) -> Result<(), StepError> {
        let delay = policy.backoff_delay(attempt);
        warn!(
            "Attempt {}/{} failed for step {}: {}. Retrying in {:?}",
            attempt, policy.max_attempts, step.step_id, error, delay
        );
        self.progress
            .on_retry_scheduled(attempt, delay, &error.to_string());
        sleep_unless_interrupted(&*self.interruption, &step.root_plan_id, delay).await
    }

    async fn request(
        &self,
        step: &AgentStep,
        prompt: &ThinkPrompt,
        tool_call_id: &str,
    ) -> Result<LlmResponse, GatewayError> {
        let request = LlmRequest {
            model: self.profile.model.clone(),
            messages: prompt.messages.clone(),
            tools: self.tools.definitions(&self.available_tools()),
            metadata: RequestMetadata {
                tool_call_id: tool_call_id.to_string(),
                plan_depth: step.plan_depth,
            },
        };
        let handle = self.llm.stream(request).await?;
        let progress = self.progress.clone();
        handle
            .collect_response(move |chunk| progress.on_llm_chunk(chunk))
            .await
    }

    fn build_prompt(&self, step: &AgentStep) -> ThinkPrompt {
        let system = AgentPromptTemplate::step_system(&self.profile, step, &system_info());

        let history: Vec<Message> = self
            .memory
            .get(&step.current_plan_id)
            .into_iter()
            .filter(Message::is_persistable)
            .collect();

        let states: BTreeMap<String, String> = self
            .available_tools()
            .into_iter()
            .filter_map(|name| {
                let state = self.tools.resolve(&name)?.current_state();
                Some((name, state))
            })
            .collect();
        let env = AgentPromptTemplate::env_snapshot(&AgentPromptTemplate::env_data(&states));

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(&system));
        messages.extend(history.iter().cloned());
        messages.push(Message::env_snapshot(&env));

        ThinkPrompt {
            messages,
            history,
            think_input: format!("{}\n{}", system, env),
        }
    }

    /// Tools offered to the model: the profile's list, or every registered
    /// tool when the profile names none.
    fn available_tools(&self) -> Vec<String> {
        if self.profile.available_tools.is_empty() {
            self.tools.tool_names()
        } else {
            self.profile.available_tools.clone()
        }
    }

    fn record_think(&self, step: &AgentStep, proposal: &ThinkProposal) {
        let params = proposal
            .calls
            .iter()
            .map(|call| ActToolParam::new(&call.tool_name, &call.arguments, &proposal.tool_call_id))
            .collect();
        let record = ThinkActRecord::new(
            new_think_act_id(),
            &step.step_id,
            &proposal.think_input,
            &proposal.think_output,
        )
        .with_tool_params(params);
        if let Err(e) = self.recorder.record_think_and_action(step, &record) {
            warn!("Failed to record think for step {}: {}", step.step_id, e);
        }
    }
}

fn system_info() -> SystemInfo {
    SystemInfo {
        os: std::env::consts::OS.to_string(),
        current_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
