//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::history::HistoryCommand;
use crate::commands::scan::ScanArgs;
use crate::commands::visits::VisitsCommand;

/// Photograph a dish, get a diabetic-suitability verdict, keep a history.
#[derive(Parser, Debug)]
#[command(name = "diabeto")]
#[command(author, version = env!("DIABETO_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to config.json in the platform config dir)
    #[arg(long, global = true, env = "DIABETO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip recording this run with the visit counter
    #[arg(long, global = true)]
    pub no_track: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account registration and sign-in
    Auth(AuthCommand),

    /// Classify a food photo and save the result to history
    Scan(ScanArgs),

    /// Browse past scans
    History(HistoryCommand),

    /// Device visit counter
    Visits(VisitsCommand),
}
