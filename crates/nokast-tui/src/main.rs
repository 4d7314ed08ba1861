//! Nokast TUI - terminal front end for the Nokast newsletter digest backend
//!
//! Shows the generated digest, manages local models and edits the backend's
//! settings. Logs go to a file because the terminal belongs to the UI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use nokast_common::logging::{init_tracing, LogSink};
use nokast_tui::{application, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("nokast-tui")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal front end for the Nokast newsletter digest backend")
        .arg(
            Arg::new("server")
                .short('s')
                .long("server")
                .value_name("URL")
                .help("Nokast backend URL"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print an example configuration file and exit"),
        )
        .get_matches();

    if matches.get_flag("print-config") {
        print!("{}", Config::generate_example());
        return Ok(());
    }

    let config = Config::load(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        matches.get_one::<String>("server").map(String::as_str),
        matches.get_one::<String>("log-level").map(String::as_str),
    )?;

    let _guard = init_tracing(&config.client.logging, LogSink::File)?;

    info!(server = %config.client.server_url, "Starting Nokast TUI");
    application::run(config).await?;
    info!("Nokast TUI shutting down");
    Ok(())
}
