//! Session storage for persisting sign-in state between runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use diabeto_core::{AuthSession, IdToken, RefreshToken, UserId};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    backend: String,
    principal: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// `session.json` in the data directory.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session.json"),
        }
    }

    /// Save a session, readable only by the owner.
    pub fn save(&self, backend: &str, session: &AuthSession) -> Result<()> {
        let stored = StoredSession {
            backend: backend.to_string(),
            principal: session.principal.to_string(),
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            id_token: session.id_token.as_str().to_string(),
            refresh_token: session.refresh_token.as_ref().map(|t| t.as_str().to_string()),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, &json).context("Failed to write session file")?;

        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// Load the saved session, if any.
    ///
    /// A session saved against a different backend is an error rather than
    /// silently ignored.
    pub fn load(&self, backend: &str) -> Result<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).context("Failed to read session file")?;
        let stored: StoredSession = serde_json::from_str(&json).context("Invalid session file")?;

        if stored.backend != backend {
            bail!(
                "Saved session belongs to the {} backend. Run 'diabeto auth login' again.",
                stored.backend
            );
        }

        Ok(Some(AuthSession {
            principal: UserId::new(stored.principal).context("Invalid user id in session")?,
            email: stored.email,
            display_name: stored.display_name,
            id_token: IdToken::new(stored.id_token),
            refresh_token: stored.refresh_token.map(RefreshToken::new),
        }))
    }

    /// Load the saved session or fail with a sign-in hint.
    pub fn require(&self, backend: &str) -> Result<AuthSession> {
        self.load(backend)?
            .context("Not signed in. Run 'diabeto auth login' first.")
    }

    /// Remove the saved session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to remove session file")?;
        Ok(true)
    }
}
