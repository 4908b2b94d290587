//! History commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;

use diabeto_core::traits::Language;
use diabeto_core::workflow::HistoryBrowser;
use diabeto_core::DocumentId;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub command: HistorySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum HistorySubcommand {
    /// List past scans, newest first
    List(ListArgs),

    /// Delete a scan from history
    Delete(DeleteArgs),

    /// Share a scan's result text
    Share(RecordArgs),

    /// Read a scan's result aloud
    Speak(SpeakArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print one JSON object per record
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Record id as shown by 'history list'
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record id as shown by 'history list'
    pub id: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct SpeakArgs {
    /// Record id as shown by 'history list'
    pub id: String,

    /// Speak the Hindi text
    #[arg(long)]
    pub hindi: bool,
}

pub async fn handle(app: &App, cmd: HistoryCommand) -> Result<()> {
    let session = app.require_session()?;
    let mut browser = HistoryBrowser::open(&app.context(), Some(&session))
        .map_err(output::alert("History unavailable"))?;
    browser
        .refresh()
        .await
        .map_err(output::alert("Failed to load history"))?;

    match cmd.command {
        HistorySubcommand::List(args) => list(&browser, args),
        HistorySubcommand::Delete(args) => {
            let id = existing(&browser, &args.id)?;
            if !args.yes && !confirm(&format!("Delete {id}?"))? {
                eprintln!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
            browser
                .delete(&id)
                .await
                .map_err(output::alert("Failed to delete"))?;
            output::success("Deleted");
            Ok(())
        }
        HistorySubcommand::Share(args) => {
            let id = existing(&browser, &args.id)?;
            browser.share(&id).await;
            Ok(())
        }
        HistorySubcommand::Speak(args) => {
            let id = existing(&browser, &args.id)?;
            let language = if args.hindi {
                Language::Hindi
            } else {
                Language::English
            };
            browser.speak(&id, language).await;
            Ok(())
        }
    }
}

fn list(browser: &HistoryBrowser, args: ListArgs) -> Result<()> {
    let records = browser.records();
    if records.is_empty() {
        eprintln!("{}", "No history yet.".dimmed());
        return Ok(());
    }

    for record in records {
        if args.json {
            output::json(record)?;
        } else {
            output::record(record);
            println!();
        }
    }
    Ok(())
}

/// Ask on stderr, read the answer from stdin. Anything but y/yes declines.
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn existing(browser: &HistoryBrowser, id: &str) -> Result<DocumentId> {
    let id = DocumentId::new(id).context("Invalid record id")?;
    if browser.find(&id).is_none() {
        bail!("No history record {id}");
    }
    Ok(id)
}
