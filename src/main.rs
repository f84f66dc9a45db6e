use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;
mod config;
mod env;
mod registry;
mod resolve;
mod startup;
mod validate;

use cli::{Cli, Commands};
use config::FileConfigSource;
use startup::{ExitClass, StartupFailure};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let source = FileConfigSource::new(cli.config.clone());

    match dispatch(cli, &source).await {
        Ok(code) => code,
        Err(err) => {
            // Startup failures carry their own exit-code class; everything
            // else is a general error.
            if let Some(failure) = err.downcast_ref::<StartupFailure>() {
                eprintln!("❌ {}", failure);
                exit_code(failure.class)
            } else {
                eprintln!("❌ {:#}", err);
                exit_code(ExitClass::General)
            }
        }
    }
}

async fn dispatch(cli: Cli, source: &FileConfigSource) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::List) => {
            command::run_list(source).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Use { name }) => {
            command::run_use(&name, source).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Check {
            name,
            provider,
            model,
        }) => {
            command::run_check(name.as_deref(), provider.as_deref(), model.as_deref(), source)
                .await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Status) => {
            command::run_status(source).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Run {
            name,
            provider,
            model,
            tool,
        }) => {
            let code = command::run_run(
                name.as_deref(),
                provider.as_deref(),
                model.as_deref(),
                &tool,
                source,
            )
            .await?;
            Ok(ExitCode::from(code.clamp(0, 255) as u8))
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Use 'llmctl list' to see configurations or 'llmctl run <tool>' to launch.");
            Ok(exit_code(ExitClass::General))
        }
    }
}

fn exit_code(class: ExitClass) -> ExitCode {
    ExitCode::from(class.code() as u8)
}
