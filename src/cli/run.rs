//! Handlers behind the CLI subcommands.

use std::io::Write;
use std::sync::Arc;

use crate::agent::{
    AgentConfig, CallerIdentity, ExecutionEngine, ExecutionResult, ExecutionStep, StepKind,
    StepPayload, StepSink,
};
use crate::config::AgentryConfig;
use crate::error::AgentryError;
use crate::provider::LlmGateway;
use crate::tools::ToolRegistry;

use super::{RunArgs, ToolsArgs};

const PREVIEW_MAX_CHARS: usize = 200;

/// Execute one agent definition and print its trace or JSON result.
pub async fn handle_run(args: RunArgs) -> Result<ExecutionResult, AgentryError> {
    let config = AgentryConfig::load(args.config.as_deref())?;
    let agent = AgentConfig::from_file(&args.agent)?;

    let gateway = LlmGateway::from_config(&config)?;
    let tools = ToolRegistry::with_builtin_tools(&config)?;
    let mut engine = ExecutionEngine::new(
        Arc::new(gateway),
        Arc::new(tools),
        Arc::new(config.price_table()),
    )
    .with_defaults(*config.defaults());
    if !args.json {
        let sink: StepSink = Arc::new(|step: &ExecutionStep| {
            eprintln!("{}", format_step(step));
        });
        engine = engine.with_step_sink(sink);
    }

    let caller = args
        .user
        .map(CallerIdentity::user)
        .unwrap_or_else(CallerIdentity::anonymous);
    let result = engine.execute(&agent, &args.input, &caller).await;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &result)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", result.output)?;
        writeln!(
            stdout,
            "\n[{}] iterations={} tokens={} cost=${:.6} duration={}ms",
            result.status,
            result.iterations,
            result.usage.total_tokens,
            result.cost,
            result.duration_ms
        )?;
        if let Some(error) = &result.error {
            writeln!(stdout, "error: {error}")?;
        }
    }
    Ok(result)
}

/// List built-in tools with their configuration state.
pub fn handle_tools(args: ToolsArgs) -> Result<(), AgentryError> {
    let config = AgentryConfig::load(args.config.as_deref())?;
    let registry = ToolRegistry::with_builtin_tools(&config)?;
    let mut stdout = std::io::stdout().lock();
    for name in registry.names() {
        let Some(tool) = registry.get(name) else {
            continue;
        };
        let state = if tool.is_configured() {
            "configured"
        } else {
            "not configured"
        };
        writeln!(stdout, "{name:<20} {state:<16} {}", tool.description())?;
    }
    Ok(())
}

/// One-line rendering of a step for terminal output.
pub fn format_step(step: &ExecutionStep) -> String {
    let body = match &step.payload {
        StepPayload::Text(text) => preview(text),
        StepPayload::Action {
            tool_name,
            arguments,
        } => format!("{tool_name} {}", preview(&arguments.to_string())),
    };
    let label = match step.kind {
        StepKind::Reasoning => "thought",
        StepKind::Action => "action",
        StepKind::Observation => "observation",
        StepKind::Final => "final",
    };
    format!("#{} {label}: {body}", step.step_number)
}

fn preview(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= PREVIEW_MAX_CHARS {
        return single_line;
    }
    let truncated: String = single_line.chars().take(PREVIEW_MAX_CHARS).collect();
    format!("{truncated}...")
}
