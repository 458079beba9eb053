//! Fakes shared by the step engine tests.

use super::StepExecutor;
use crate::form_input::FormInputHandle;
use crate::ports::conversation_memory::ConversationMemory;
use crate::ports::execution_recorder::{ExecutionRecorder, RecorderError};
use crate::ports::interruption::InterruptionOracle;
use crate::ports::llm_gateway::{GatewayError, LlmClient, LlmRequest, StreamHandle};
use crate::ports::tool_registry::{Tool, ToolRegistryPort};
use crate::use_cases::user_input::UserInputWaitCoordinator;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskpilot_domain::{
    ActToolParam, AgentProfile, AgentStep, ContentBlock, LlmResponse, Message, StopReason,
    StreamEvent, ThinkActRecord, ToolCapabilities, ToolContext, ToolDefinition, ToolError,
    UserFormInput,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// ==================== LLM ====================

pub(crate) enum Scripted {
    Response(LlmResponse),
    Error(GatewayError),
}

impl Scripted {
    pub(crate) fn text(text: &str) -> Self {
        Scripted::Response(LlmResponse::from_text(text))
    }

    pub(crate) fn tool_calls(text: &str, calls: &[(&str, &str, &str)]) -> Self {
        let mut content = Vec::new();
        if !text.is_empty() {
            content.push(ContentBlock::text(text));
        }
        content.extend(
            calls
                .iter()
                .map(|(id, name, args)| ContentBlock::tool_use(*id, *name, *args)),
        );
        Scripted::Response(LlmResponse {
            content,
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        })
    }

    pub(crate) fn error(err: GatewayError) -> Self {
        Scripted::Error(err)
    }
}

#[derive(Default)]
pub(crate) struct ScriptedLlm {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn stream(&self, request: LlmRequest) -> Result<StreamHandle, GatewayError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        let response = match next {
            Some(Scripted::Response(response)) => response,
            Some(Scripted::Error(err)) => return Err(err),
            None => LlmResponse::from_text(""),
        };
        let (tx, rx) = mpsc::channel(4);
        let text = response.text_content();
        if !text.is_empty() {
            let _ = tx.send(StreamEvent::Delta(text)).await;
        }
        let _ = tx.send(StreamEvent::Completed(response)).await;
        Ok(StreamHandle::new(rx))
    }
}

// ==================== Tools ====================

pub(crate) struct FakeTool {
    definition: ToolDefinition,
    delay: Duration,
    sleeps_on_args: bool,
    behavior: fn(&Map<String, Value>) -> Result<String, ToolError>,
    can_terminate: bool,
    form: Option<FormInputHandle>,
    executions: AtomicUsize,
}

impl FakeTool {
    pub(crate) fn new(
        name: &str,
        capabilities: ToolCapabilities,
        behavior: fn(&Map<String, Value>) -> Result<String, ToolError>,
    ) -> Self {
        Self {
            definition: ToolDefinition::new(name, format!("{name} tool"), capabilities),
            delay: Duration::ZERO,
            sleeps_on_args: false,
            behavior,
            can_terminate: true,
            form: None,
            executions: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep for the `ms` argument instead of a fixed delay.
    pub(crate) fn sleeping_on_args(mut self) -> Self {
        self.sleeps_on_args = true;
        self
    }

    pub(crate) fn refusing_termination(mut self) -> Self {
        self.can_terminate = false;
        self
    }

    pub(crate) fn with_form(mut self, form: FormInputHandle) -> Self {
        self.form = Some(form);
        self
    }

    pub(crate) fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for FakeTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        let delay = if self.sleeps_on_args {
            Duration::from_millis(args.get("ms").and_then(Value::as_u64).unwrap_or_default())
        } else {
            self.delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(form) = &self.form {
            form.begin(UserFormInput {
                title: args
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or("Form")
                    .to_string(),
                description: String::new(),
                inputs: vec![taskpilot_domain::InputItem::new("answer", "Answer")],
            });
            return Ok(form.describe());
        }
        (self.behavior)(args)
    }

    fn can_terminate(&self) -> bool {
        self.can_terminate
    }

    fn current_state(&self) -> String {
        self.form
            .as_ref()
            .filter(|f| f.state().is_some())
            .map(FormInputHandle::describe)
            .unwrap_or_default()
    }

    fn form_input(&self) -> Option<FormInputHandle> {
        self.form.clone()
    }
}

fn echo(args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok(format!(
        "echo: {}",
        args.get("text").and_then(Value::as_str).unwrap_or_default()
    ))
}

fn message(args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok(args
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("terminated")
        .to_string())
}

fn report(args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok(serde_json::json!({
        "errorMessage": args.get("errorMessage").cloned().unwrap_or(Value::Null),
        "timestamp": "2025-01-01T00:00:00Z",
    })
    .to_string())
}

fn quoted(_args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok("\"line one\\nline two\"".to_string())
}

fn failing(_args: &Map<String, Value>) -> Result<String, ToolError> {
    Err(ToolError::execution_failed("disk full"))
}

fn slept(args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok(format!(
        "slept {}",
        args.get("ms").and_then(Value::as_u64).unwrap_or_default()
    ))
}

fn panicking(_args: &Map<String, Value>) -> Result<String, ToolError> {
    panic!("tool exploded")
}

fn letter_a(_args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok("A".to_string())
}

fn letter_b(_args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok("B".to_string())
}

fn letter_c(_args: &Map<String, Value>) -> Result<String, ToolError> {
    Ok("C".to_string())
}

pub(crate) struct FakeRegistry {
    tools: HashMap<String, Arc<FakeTool>>,
    cleaned: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub(crate) fn standard(form: FormInputHandle) -> Self {
        let tools = vec![
            FakeTool::new("echo", ToolCapabilities::regular(), echo),
            FakeTool::new("quoted", ToolCapabilities::regular(), quoted),
            FakeTool::new("failing", ToolCapabilities::regular(), failing),
            FakeTool::new("panicking", ToolCapabilities::regular(), panicking),
            FakeTool::new("sleepy", ToolCapabilities::regular(), slept).sleeping_on_args(),
            FakeTool::new("terminate", ToolCapabilities::terminate(), message)
                .refusing_termination(),
            FakeTool::new("broken_terminate", ToolCapabilities::terminate(), failing),
            FakeTool::new("finish", ToolCapabilities::terminal(), message),
            FakeTool::new("not_yet", ToolCapabilities::terminal(), message)
                .refusing_termination(),
            FakeTool::new("error_report", ToolCapabilities::error_report(), report),
            FakeTool::new(
                "system_error_report",
                ToolCapabilities::system_error_report(),
                report,
            ),
            FakeTool::new("form_input", ToolCapabilities::form_input(), echo).with_form(form),
            FakeTool::new("slow_a", ToolCapabilities::regular(), letter_a)
                .with_delay(Duration::from_millis(20)),
            FakeTool::new("slow_b", ToolCapabilities::regular(), letter_b)
                .with_delay(Duration::from_millis(30)),
            FakeTool::new("slow_c", ToolCapabilities::regular(), letter_c)
                .with_delay(Duration::from_millis(10)),
        ];
        Self {
            tools: tools
                .into_iter()
                .map(|t| (t.definition.name.clone(), Arc::new(t)))
                .collect(),
            cleaned: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn tool(&self, name: &str) -> Arc<FakeTool> {
        self.tools[name].clone()
    }

    pub(crate) fn cleaned(&self) -> Vec<String> {
        let mut cleaned = self.cleaned.lock().unwrap().clone();
        cleaned.dedup();
        cleaned
    }
}

impl ToolRegistryPort for FakeRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|t| t.clone() as Arc<dyn Tool>)
    }

    fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl FakeRegistry {
    fn record_cleanup(&self, plan_id: &str) {
        self.cleaned.lock().unwrap().push(plan_id.to_string());
    }
}

/// Registry wrapper that observes `cleanup` calls.
pub(crate) struct ObservedRegistry(pub(crate) Arc<FakeRegistry>);

struct CleanupSpy {
    inner: Arc<dyn Tool>,
    registry: Arc<FakeRegistry>,
}

#[async_trait]
impl Tool for CleanupSpy {
    fn definition(&self) -> &ToolDefinition {
        self.inner.definition()
    }

    async fn execute(
        &self,
        args: &Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        self.inner.execute(args, ctx).await
    }

    fn can_terminate(&self) -> bool {
        self.inner.can_terminate()
    }

    fn current_state(&self) -> String {
        self.inner.current_state()
    }

    fn form_input(&self) -> Option<FormInputHandle> {
        self.inner.form_input()
    }

    fn cleanup(&self, plan_id: &str) {
        self.registry.record_cleanup(plan_id);
    }
}

impl ToolRegistryPort for ObservedRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let inner = self.0.resolve(name)?;
        Some(Arc::new(CleanupSpy {
            inner,
            registry: self.0.clone(),
        }))
    }

    fn tool_names(&self) -> Vec<String> {
        self.0.tool_names()
    }
}

// ==================== Memory / Recorder / Oracle ====================

#[derive(Default)]
pub(crate) struct MemoryStore {
    plans: Mutex<HashMap<String, Vec<Message>>>,
}

impl ConversationMemory for MemoryStore {
    fn append(&self, plan_id: &str, message: Message) {
        self.plans
            .lock()
            .unwrap()
            .entry(plan_id.to_string())
            .or_default()
            .push(message);
    }

    fn clear(&self, plan_id: &str) {
        self.plans.lock().unwrap().remove(plan_id);
    }

    fn get(&self, plan_id: &str) -> Vec<Message> {
        self.plans
            .lock()
            .unwrap()
            .get(plan_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub(crate) struct MemoryRecorder {
    think_acts: Mutex<Vec<ThinkActRecord>>,
    results: Mutex<Vec<Vec<ActToolParam>>>,
}

impl MemoryRecorder {
    pub(crate) fn think_acts(&self) -> Vec<ThinkActRecord> {
        self.think_acts.lock().unwrap().clone()
    }

    pub(crate) fn results(&self) -> Vec<Vec<ActToolParam>> {
        self.results.lock().unwrap().clone()
    }
}

impl ExecutionRecorder for MemoryRecorder {
    fn record_think_and_action(
        &self,
        _step: &AgentStep,
        record: &ThinkActRecord,
    ) -> Result<(), RecorderError> {
        self.think_acts.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn record_action_result(&self, params: &[ActToolParam]) -> Result<(), RecorderError> {
        self.results.lock().unwrap().push(params.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FlagOracle {
    token: CancellationToken,
}

impl FlagOracle {
    pub(crate) fn interrupt(&self) {
        self.token.cancel();
    }
}

#[async_trait]
impl InterruptionOracle for FlagOracle {
    fn should_continue(&self, _root_plan_id: &str) -> bool {
        !self.token.is_cancelled()
    }

    async fn interrupted(&self, _root_plan_id: &str) {
        self.token.cancelled().await
    }
}

// ==================== Harness ====================

pub(crate) struct Harness {
    pub(crate) llm: Arc<ScriptedLlm>,
    pub(crate) tools: Arc<FakeRegistry>,
    pub(crate) memory: Arc<MemoryStore>,
    pub(crate) recorder: Arc<MemoryRecorder>,
    pub(crate) oracle: Arc<FlagOracle>,
    pub(crate) user_input: Arc<UserInputWaitCoordinator>,
    pub(crate) form: FormInputHandle,
}

impl Harness {
    pub(crate) fn new(script: Vec<Scripted>) -> Self {
        let form = FormInputHandle::new();
        let llm = ScriptedLlm::default();
        llm.script.lock().unwrap().extend(script);
        Self {
            llm: Arc::new(llm),
            tools: Arc::new(FakeRegistry::standard(form.clone())),
            memory: Arc::new(MemoryStore::default()),
            recorder: Arc::new(MemoryRecorder::default()),
            oracle: Arc::new(FlagOracle::default()),
            user_input: Arc::new(UserInputWaitCoordinator::default()),
            form,
        }
    }

    pub(crate) fn interrupt(&self) {
        self.oracle.interrupt();
    }

    pub(crate) fn step(&self) -> AgentStep {
        AgentStep::new("step-1", "plan-1", "plan-1").with_requirement("Finish the task")
    }

    pub(crate) fn executor(&self) -> StepExecutor<ScriptedLlm> {
        StepExecutor::new(
            self.llm.clone(),
            Arc::new(ObservedRegistry(self.tools.clone())),
            self.memory.clone(),
            self.user_input.clone(),
            AgentProfile::default(),
        )
        .with_recorder(self.recorder.clone())
        .with_interruption(self.oracle.clone())
    }
}
