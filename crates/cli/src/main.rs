// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbx` — operator CLI for the sandbox execution abstraction layer.
//!
//! Not the agent driver (§6 "CLI surface... the core is a library consumed
//! by the agent driver"): this binary is a thin, one-shot wrapper over
//! `sbx-backends`/`sbx-executor` for provisioning a sandbox by hand,
//! checking a sidecar's health, and replaying a single tool call against a
//! workspace — the operations an operator needs without standing up the
//! full agent loop.

mod color;
mod commands;
mod env;
mod exit_error;
mod output;

use clap::Parser;
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "sbx", version = built_version(), styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Provision, inspect, or tear down a sandbox.
    Sandbox(commands::sandbox::SandboxArgs),
    /// Grade a sandbox's health.
    Health(commands::health::HealthArgs),
    /// Exercise a single file/search/command/git tool operation.
    Tool(commands::tool::ToolArgs),
}

fn built_version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(env::log_filter())).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Sandbox(args) => commands::sandbox::run(args).await,
        Command::Health(args) => commands::health::run(args).await,
        Command::Tool(args) => commands::tool::run(args).await,
    };

    if let Err(err) = result {
        let exit = match err.downcast::<ExitError>() {
            Ok(exit_error) => exit_error,
            Err(err) => ExitError::new(1, err.to_string()),
        };
        eprintln!("{}: {}", color::bad("error"), exit.message);
        std::process::exit(exit.code);
    }
}
