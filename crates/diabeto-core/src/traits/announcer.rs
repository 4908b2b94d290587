//! Speech and share output trait.

use async_trait::async_trait;

use crate::Result;

/// Speech language for [`Announcer::speak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// English.
    English,
    /// Hindi (India).
    Hindi,
}

impl Language {
    /// BCP 47 tag handed to the speech engine.
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi-IN",
        }
    }
}

/// Device output for sharing and reading aloud a record's text.
///
/// Callers treat both operations as best-effort.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Read `text` aloud.
    async fn speak(&self, text: &str, language: Language) -> Result<()>;

    /// Hand `text` to the platform share target.
    async fn share(&self, text: &str) -> Result<()>;
}
