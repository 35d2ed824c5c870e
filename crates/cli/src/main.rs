//! merinfo command-line entry point.
//!
//! Results go to stdout; logs go to stderr so output can be piped.

use std::process::ExitCode;

use clap::Parser;
use merinfo_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod app;
mod args;
mod output;

use args::Cli;

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => app::run(&cli, &config, &mut std::io::stdout().lock()).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
