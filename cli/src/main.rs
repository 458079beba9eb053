//! CLI entrypoint for taskpilot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use taskpilot_application::{
    ExecutionRecorder, NoStepProgress, RunAgentInput, RunAgentUseCase, StepExecutor,
    StepProgressNotifier, ToolRegistryPort, UserInputWaitCoordinator,
};
use taskpilot_domain::{ConfigIssue, Severity};
use taskpilot_infrastructure::{
    ConfigLoader, FileConfig, InMemoryConversationMemory, JsonlExecutionRecorder,
    PlanExecutionState, PlanInterruptionRegistry, ReplayLlmClient, ToolRegistry, TracingRecorder,
};
use taskpilot_presentation::{
    Cli, Command, ConsoleFormatter, FormPrompter, OutputFormat, ProgressReporter, RunArgs,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let _log_guard = init_logging(&cli, &config)?;
    info!("Starting taskpilot");

    report_issues(&config.validate())?;

    match cli.command {
        Command::Config => {
            show_config(&config, cli.config.as_deref(), cli.no_config)?;
            Ok(())
        }
        Command::Run(args) => run(args, config).await,
    }
}

/// Initialize logging based on verbosity level; RUST_LOG wins when set.
fn init_logging(cli: &Cli, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => config.logging.level.as_deref().unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let log_dir = cli.log_dir.clone().or_else(|| config.logging.log_dir.clone());
    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::daily(&log_dir, "taskpilot.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(Some(guard))
}

/// Print warnings; abort on errors.
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    let mut errors = 0;
    for issue in issues {
        match issue.severity {
            Severity::Warning => {
                eprintln!("{} {}", "warning:".yellow().bold(), issue.message);
            }
            Severity::Error => {
                errors += 1;
                eprintln!("{} {}", "error:".red().bold(), issue.message);
            }
        }
    }
    if errors > 0 {
        bail!("Configuration has {} error(s)", errors);
    }
    Ok(())
}

fn show_config(config: &FileConfig, explicit: Option<&Path>, no_config: bool) -> Result<()> {
    println!("{}", "Configuration sources:".cyan().bold());
    if no_config {
        println!("  (disabled, built-in defaults only)");
    } else {
        for source in ConfigLoader::config_sources(explicit) {
            println!("  {}", source);
        }
    }
    println!();
    println!("{}", "Effective configuration:".cyan().bold());
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

async fn run(args: RunArgs, config: FileConfig) -> Result<()> {
    let mut params = config.step_params();
    if let Some(max_steps) = args.max_steps {
        params = params.with_max_steps(max_steps);
    }

    // === Dependency Injection ===
    let llm = Arc::new(
        ReplayLlmClient::from_file(&args.script)
            .with_context(|| format!("Failed to load script {}", args.script.display()))?,
    );

    let tools = ToolRegistry::with_builtins();
    report_issues(&config.agent.validate_tools(&tools.tool_names()))?;
    let tools: Arc<dyn ToolRegistryPort> = Arc::new(tools);

    let memory = Arc::new(InMemoryConversationMemory::new(config.agent.max_memory));
    let user_input = Arc::new(UserInputWaitCoordinator::from_params(&params));
    let interruption = Arc::new(PlanInterruptionRegistry::new());

    let recorder: Arc<dyn ExecutionRecorder> =
        match args.record.clone().or_else(|| config.logging.record_file.clone()) {
            Some(path) => Arc::new(
                JsonlExecutionRecorder::new(&path)
                    .with_context(|| format!("Failed to open record file {}", path.display()))?,
            ),
            None => Arc::new(TracingRecorder),
        };

    let (form_tx, form_rx) = mpsc::unbounded_channel();
    let mut prompter = FormPrompter::new(user_input.clone()).with_answers(args.answers.clone());
    if args.no_input {
        prompter = prompter.non_interactive();
    }
    let prompter_task = tokio::spawn(prompter.run(form_rx));

    let progress: Arc<dyn StepProgressNotifier> = if args.quiet {
        drop(form_tx);
        Arc::new(NoStepProgress)
    } else {
        Arc::new(
            ProgressReporter::new()
                .verbose(args.output == OutputFormat::Text)
                .with_form_channel(form_tx),
        )
    };

    let executor = StepExecutor::new(
        llm,
        tools,
        memory,
        user_input,
        config.agent.to_profile(),
    )
    .with_params(params)
    .with_recorder(recorder)
    .with_interruption(interruption.clone())
    .with_progress(progress);
    let use_case = RunAgentUseCase::new(executor);

    let plan_id = args
        .plan_id
        .clone()
        .unwrap_or_else(|| format!("plan-{}", uuid::Uuid::new_v4()));
    let input = RunAgentInput::for_requirement(&plan_id, "step-1", &args.requirement);

    // Ctrl-C cancels the plan; the engine reports INTERRUPTED
    let signal_registry = interruption.clone();
    let signal_plan = plan_id.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling plan {}", signal_plan);
            signal_registry.set_state(&signal_plan, PlanExecutionState::Cancel);
        }
    });

    let output = use_case.execute(input).await?;
    interruption.remove(&plan_id);
    prompter_task.abort();

    let rendered = match args.output {
        OutputFormat::Text => ConsoleFormatter::format(&output),
        OutputFormat::Json => ConsoleFormatter::format_json(&output),
    };
    println!("{}", rendered);

    if !output.success() {
        bail!("Step {} ended in {}", output.step.step_id, output.state());
    }
    Ok(())
}
