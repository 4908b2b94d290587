//! Scan command: photo in, verdict out, record saved.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use diabeto_core::workflow::{ImageSource, run_scan};

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// JPEG file to classify, or '-' to read it from stdin
    pub image: String,

    /// Print the saved record as JSON
    #[arg(long)]
    pub json: bool,
}

fn source(image: &str) -> Result<ImageSource> {
    if image == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read image from stdin")?;
        return Ok(ImageSource::Bytes(bytes));
    }
    Ok(ImageSource::Path(PathBuf::from(image)))
}

pub async fn run(app: &App, args: ScanArgs) -> Result<()> {
    let session = app.require_session()?;
    let ctx = app.scan_context(&session).await?;
    let image = source(&args.image)?;

    eprintln!("{}", "Analyzing...".dimmed());
    let outcome = run_scan(&ctx, Some(&session), image)
        .await
        .map_err(output::alert("Scan failed"))?;

    if args.json {
        return output::json(&serde_json::json!({
            "id": outcome.record_id.as_str(),
            "image": outcome.image_url,
            "response": outcome.response,
            "responseHindi": outcome.response_hindi,
        }));
    }

    output::success("Saved to history");
    output::field("Record", outcome.record_id.as_str());
    println!();
    println!("{}", outcome.response);
    if let Some(hindi) = &outcome.response_hindi {
        println!();
        println!("{hindi}");
    }
    Ok(())
}
