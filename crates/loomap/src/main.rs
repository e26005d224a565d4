mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use loomap_core::{Dashboard, StaticLocation};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "loomap", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let resolved = config::resolve(&cli.global)?;
            let location = Arc::new(StaticLocation::new(resolved.location));
            let dashboard = Dashboard::new(resolved.client, resolved.credentials, location)?;

            tracing::debug!(command = ?cmd, profile = %resolved.profile_name, "dispatching command");
            let result = tokio::select! {
                result = commands::dispatch(cmd, &dashboard, &cli.global) => result,
                _ = tokio::signal::ctrl_c() => Err(CliError::Internal("interrupted".into())),
            };
            // Anything still in flight (address lookups, position requests)
            // is discarded here.
            dashboard.shutdown();
            result
        }
    }
}
