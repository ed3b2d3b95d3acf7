//! ec2-runner - ephemeral EC2 instances as self-hosted GitHub Actions runners

use std::process::ExitCode;

use clap::Parser;
use ec2_runner_cli::cli::Cli;
use ec2_runner_cli::domain::ConfigError;
use ec2_runner_cli::infra::logging::init_tracing;
use ec2_runner_cli::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let code = if e.downcast_ref::<ConfigError>().is_some() {
                "config"
            } else {
                "error"
            };
            match format_error(&format!("{e:#}"), code) {
                Ok(doc) if json => println!("{doc}"),
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
