//! DSV action entrypoint.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;
mod sinks;

use commands::ActionArgs;
use config::ActionConfig;
use dsv_client::VaultClient;

#[derive(Parser)]
#[command(name = "dsv-action")]
#[command(author, version, about = "Expose DevOps Secrets Vault fields as CI outputs", long_about = None)]
struct Cli {
    #[command(flatten)]
    args: ActionArgs,

    /// Validate inputs and print the planned outputs without calling the vault
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries workflow commands, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match ActionConfig::resolve(&cli.args) {
        Ok(config) => config,
        Err((format, err)) => {
            sinks::report_error(format, &anyhow::Error::new(err));
            return ExitCode::FAILURE;
        }
    };

    match execute(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sinks::report_error(config.output_format, &err);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: &Cli, config: &ActionConfig) -> anyhow::Result<()> {
    if cli.dry_run {
        handlers::dry_run(config)?;
        return Ok(());
    }

    let client = VaultClient::for_server(&config.server)?.with_client_name(config.client_name());
    handlers::run(config, client).await?;
    Ok(())
}
