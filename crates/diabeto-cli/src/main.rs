//! diabeto - food photo scanner for diabetic diets.
//!
//! A thin shell over `diabeto-core`: it loads configuration, builds the
//! client context for the configured backend and dispatches to the
//! workflows.

mod announcer;
mod app;
mod cli;
mod commands;
mod config;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use app::App;
use cli::{Cli, Commands};
use commands::{auth, history, scan, visits};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    if let Err(err) = run(cli).await {
        output::error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let app = App::load(cli.config.as_deref())?;

    // The visits commands manage the counter themselves.
    let counter_command = matches!(cli.command, Commands::Visits(_));
    if !cli.no_track && !counter_command && app.config().track_visits {
        app.track_visit().await;
    }

    match cli.command {
        Commands::Auth(cmd) => auth::handle(&app, cmd).await,
        Commands::Scan(args) => scan::run(&app, args).await,
        Commands::History(cmd) => history::handle(&app, cmd).await,
        Commands::Visits(cmd) => visits::handle(&app, cmd).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
