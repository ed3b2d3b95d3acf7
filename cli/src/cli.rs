//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;
use crate::infra::env::RuntimeEnv;

/// Ephemeral EC2 instances as self-hosted GitHub Actions runners
#[derive(Parser)]
#[command(
    name = "ec2-runner",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Launch runner instances and wait until they are online
    Launch(Box<commands::launch::LaunchArgs>),

    /// Terminate runner instances and remove their registrations
    Terminate(commands::terminate::TerminateArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the command cannot
    /// run at all. Per-unit failures only affect the exit code.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
            ..
        } = self;
        let flags = AppFlags {
            no_color,
            quiet,
            json,
        };
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(ExitCode::SUCCESS)
            }
            Command::Launch(args) => {
                let app = AppContext::new(flags, &RuntimeEnv::load()?);
                commands::launch::run(&args, &app).await
            }
            Command::Terminate(args) => {
                let app = AppContext::new(flags, &RuntimeEnv::load()?);
                commands::terminate::run(&args, &app).await
            }
        }
    }
}
