//! Agentry CLI binary entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentry::agent::ExecutionStatus;
use agentry::cli::{run, Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentry=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Run(args) => match run::handle_run(args).await {
            Ok(result) if result.status == ExecutionStatus::Success => 0,
            Ok(_) => 2,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
        Commands::Tools(args) => match run::handle_tools(args) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        },
    };

    std::process::exit(code);
}
