//! Visit counter commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use diabeto_core::workflow::VisitCounter;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct VisitsCommand {
    #[command(subcommand)]
    pub command: VisitsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum VisitsSubcommand {
    /// Record a visit from this device
    Track,

    /// Show the global visitor statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget this device's visitor identity
    Reset,
}

pub async fn handle(app: &App, cmd: VisitsCommand) -> Result<()> {
    let counter = VisitCounter::new(&app.context());

    match cmd.command {
        VisitsSubcommand::Track => {
            let outcome = counter.track_now().await;
            if let Some(id) = &outcome.visitor_id {
                output::field("Visitor", id);
            }
            let note = if outcome.is_new_visit_today {
                "First visit today"
            } else {
                "Already counted today"
            };
            output::success(note);
            output::field("Days counted on this device", &counter.local_count().await.to_string());
        }
        VisitsSubcommand::Stats { json } => {
            let stats = counter.stats().await;
            if json {
                output::json(&stats)?;
            } else {
                output::field("Unique visitors", &stats.total_unique_visitors.to_string());
                output::field("Total visits", &stats.total_visits.to_string());
                if let Some(at) = stats.last_updated {
                    output::field("Last updated", &at.to_rfc3339());
                }
            }
        }
        VisitsSubcommand::Reset => {
            counter.reset().await;
            output::success("Visitor identity cleared");
        }
    }
    Ok(())
}
