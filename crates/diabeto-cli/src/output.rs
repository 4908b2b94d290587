//! Output formatting helpers.

use anyhow::{Result, anyhow};
use colored::Colorize;
use serde::Serialize;

use diabeto_core::{Error, HistoryRecord};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as one line of JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Turn a library error into the message shown to the user.
///
/// Auth and validation failures carry readable text of their own; everything
/// else is prefixed with what was being attempted.
pub fn alert(action: &'static str) -> impl FnOnce(Error) -> anyhow::Error {
    move |err| {
        if matches!(err, Error::Auth(_) | Error::Validation(_)) {
            anyhow!("{}", err.user_message())
        } else {
            anyhow!("{action}: {err}")
        }
    }
}

/// Traffic-light colouring of a verdict's leading word.
fn verdict(response: &str) -> String {
    let lower = response.trim_start().to_lowercase();
    if lower.starts_with("green") {
        response.green().to_string()
    } else if lower.starts_with("yellow") {
        response.yellow().to_string()
    } else if lower.starts_with("red") {
        response.red().to_string()
    } else {
        response.to_string()
    }
}

/// Print a history record as a block.
pub fn record(record: &HistoryRecord) {
    println!(
        "{} {}",
        record.id.as_str().bold(),
        record.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
    );
    field("Image", &record.image);
    println!("{}", verdict(&record.response));
    if let Some(hindi) = &record.response_hindi {
        println!("{hindi}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diabeto_core::AuthError;

    #[test]
    fn auth_errors_show_their_own_message() {
        let err = alert("Login failed")(Error::Auth(AuthError::WrongPassword));
        assert_eq!(err.to_string(), "Incorrect password. Please try again.");
    }

    #[test]
    fn other_errors_are_prefixed() {
        let err = alert("Scan failed")(Error::from(std::io::Error::other("disk full")));
        assert!(err.to_string().starts_with("Scan failed: "));
    }

    #[test]
    fn plain_verdict_is_uncoloured() {
        colored::control::set_override(false);
        assert_eq!(verdict("Green - safe"), "Green - safe");
    }
}
