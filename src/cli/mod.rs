//! Command-line interface for running agent definitions.

pub mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Agentry CLI
#[derive(Parser, Debug)]
#[command(name = "agentry", version, about = "Run tool-using LLM agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute an agent definition against one input
    Run(RunArgs),
    /// List built-in tools and whether each is configured
    Tools(ToolsArgs),
}

/// Arguments for `agentry run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Agent definition (TOML)
    #[arg(short, long)]
    pub agent: PathBuf,

    /// Config file (defaults to ~/.agentry/config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the full execution result as JSON
    #[arg(long)]
    pub json: bool,

    /// Caller identity recorded with the execution
    #[arg(long)]
    pub user: Option<String>,

    /// Input text for the agent
    pub input: String,
}

/// Arguments for `agentry tools`.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
