//! Terminal share and speech output.

use async_trait::async_trait;
use colored::Colorize;
use tokio::process::Command;
use tracing::debug;

use diabeto_core::error::{Error, InvalidInputError, TransportError};
use diabeto_core::traits::{Announcer, Language};

/// Shares by printing, speaks through the first speech program found.
#[derive(Debug, Clone, Default)]
pub struct CliAnnouncer {
    speech: Option<String>,
}

impl CliAnnouncer {
    /// `speech` overrides the program used for reading aloud.
    pub fn new(speech: Option<String>) -> Self {
        Self { speech }
    }

    fn candidates(&self) -> Vec<String> {
        match &self.speech {
            Some(program) => vec![program.clone()],
            None => ["say", "espeak-ng", "espeak", "spd-say"]
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

/// Arguments for the known speech programs.
fn speech_args(program: &str, text: &str, language: Language) -> Vec<String> {
    let name = std::path::Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    match name {
        "say" => vec![text.to_string()],
        "spd-say" => vec!["-w".to_string(), "-l".to_string(), language.tag().to_string(), text.to_string()],
        "espeak" | "espeak-ng" => {
            let voice = match language {
                Language::English => "en",
                Language::Hindi => "hi",
            };
            vec!["-v".to_string(), voice.to_string(), text.to_string()]
        }
        _ => vec![text.to_string()],
    }
}

#[async_trait]
impl Announcer for CliAnnouncer {
    async fn speak(&self, text: &str, language: Language) -> diabeto_core::Result<()> {
        for program in self.candidates() {
            let status = Command::new(&program)
                .args(speech_args(&program, text, language))
                .status()
                .await;
            match status {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => {
                    return Err(Error::Transport(TransportError::Io {
                        message: format!("{program} exited with {status}"),
                    }));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    debug!(program, "speech program not installed");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(Error::InvalidInput(InvalidInputError::Other {
            message: "no speech program available".to_string(),
        }))
    }

    async fn share(&self, text: &str) -> diabeto_core::Result<()> {
        println!("{}", "Shared result".bold());
        println!("{text}");
        Ok(())
    }
}
