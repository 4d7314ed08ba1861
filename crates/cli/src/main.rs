use std::process::ExitCode;

use clap::Parser;
use nokast_cli::{commands, completions, interactive, Cli, Commands};
use nokast_common::logging::{init_tracing, LogSink};
use nokast_common::{ApiClient, ClientConfig, NokastError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Backend errors carry a message meant for people.
            match e.downcast_ref::<NokastError>() {
                Some(err) => eprintln!("error: {}", err.user_message()),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        completions::generate(shell);
        return Ok(());
    }

    let config = ClientConfig::load(
        cli.config.as_deref(),
        cli.server.as_deref(),
        cli.log_level.as_deref(),
    )?;
    let _guard = init_tracing(&config.logging, LogSink::Stderr)?;
    let client = ApiClient::from_config(&config)?;

    match cli.command {
        Some(command) => commands::execute(&client, &config, command).await,
        None => interactive::run(&client).await,
    }
}
