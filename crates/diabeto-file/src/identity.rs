//! File-backed identity provider.

use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use serde_json::json;
use tracing::{debug, instrument};

use diabeto_core::error::{AuthError, Error, InvalidInputError};
use diabeto_core::traits::{AuthSession, IdentityProvider};
use diabeto_core::types::UserId;
use diabeto_core::validation::MIN_PASSWORD_LEN;
use diabeto_core::{Credentials, IdToken, Registration, Result};

use crate::store::{FileStore, LocalAccount};

/// Email/password accounts stored as JSON files with bcrypt hashes.
///
/// Id tokens are the account's uid and password hash, so changing the
/// password invalidates every issued token. No refresh tokens are issued.
#[derive(Debug, Clone)]
pub struct FileIdentity {
    store: FileStore,
    cost: u32,
}

impl FileIdentity {
    pub fn new(store: FileStore) -> Self {
        Self {
            store,
            cost: DEFAULT_COST,
        }
    }

    /// Use a different bcrypt cost for new hashes.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub(crate) fn store(&self) -> &FileStore {
        &self.store
    }

    fn make_token(uid: &str, password_hash: &str) -> IdToken {
        let token = json!({
            "uid": uid,
            "password_hash": password_hash,
        })
        .to_string();
        IdToken::new(token)
    }

    fn parse_token(token: &IdToken) -> Result<(UserId, String)> {
        let value: serde_json::Value = serde_json::from_str(token.as_str()).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("Invalid token JSON: {e}"),
            })
        })?;

        let uid = value.get("uid").and_then(|v| v.as_str()).ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::Other {
                message: "Token missing 'uid'".to_string(),
            })
        })?;

        let password_hash = value
            .get("password_hash")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::InvalidInput(InvalidInputError::Other {
                    message: "Token missing 'password_hash'".to_string(),
                })
            })?;

        Ok((UserId::new(uid)?, password_hash.to_string()))
    }

    /// Resolve a token to its account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`] for unknown or stale tokens.
    pub(crate) fn validate_token(&self, token: &IdToken) -> Result<LocalAccount> {
        let (uid, password_hash) =
            Self::parse_token(token).map_err(|_| AuthError::SessionExpired)?;
        let account = self
            .store
            .get_account(&uid)?
            .ok_or(AuthError::SessionExpired)?;

        if account.password_hash != password_hash {
            return Err(AuthError::SessionExpired.into());
        }
        Ok(account)
    }

    fn session_for(account: &LocalAccount) -> Result<AuthSession> {
        Ok(AuthSession {
            principal: UserId::new(&account.uid)?,
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            id_token: Self::make_token(&account.uid, &account.password_hash),
            refresh_token: None,
        })
    }

    fn hash_error(err: bcrypt::BcryptError) -> Error {
        Error::InvalidInput(InvalidInputError::Other {
            message: err.to_string(),
        })
    }

    /// Run a bcrypt operation off the async worker threads.
    async fn blocking<T, F>(f: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, bcrypt::BcryptError> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| {
                Error::InvalidInput(InvalidInputError::Other {
                    message: format!("hashing task failed: {e}"),
                })
            })?
            .map_err(Self::hash_error)
    }
}

#[async_trait]
impl IdentityProvider for FileIdentity {
    #[instrument(skip(self, registration))]
    async fn sign_up(&self, registration: &Registration) -> Result<AuthSession> {
        let credentials = registration.credentials();
        if self.store.find_account_by_email(credentials.email())?.is_some() {
            return Err(AuthError::EmailAlreadyInUse.into());
        }
        if credentials.password().chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword.into());
        }

        let password = credentials.password().to_string();
        let cost = self.cost;
        let password_hash = Self::blocking(move || hash(password, cost)).await?;
        let display_name = Some(registration.name()).filter(|n| !n.is_empty());
        let account = self
            .store
            .create_account(credentials.email(), display_name, &password_hash)?;

        Self::session_for(&account)
    }

    #[instrument(skip(self, credentials))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        let account = self
            .store
            .find_account_by_email(credentials.email())?
            .ok_or(AuthError::UserNotFound)?;

        let password = credentials.password().to_string();
        let stored_hash = account.password_hash.clone();
        let ok = Self::blocking(move || verify(password, &stored_hash)).await?;
        if !ok {
            return Err(AuthError::WrongPassword.into());
        }

        debug!(uid = %account.uid, "password verified");
        Self::session_for(&account)
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession> {
        let account = self.validate_token(&session.id_token)?;
        Self::session_for(&account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity() -> (TempDir, FileIdentity) {
        let dir = TempDir::new().unwrap();
        let identity = FileIdentity::new(FileStore::new(dir.path())).with_hash_cost(4);
        (dir, identity)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let (_dir, identity) = identity();
        let created = identity
            .sign_up(&Registration::new("Asha", "asha@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(created.display_name.as_deref(), Some("Asha"));

        let session = identity
            .sign_in(&Credentials::new("asha@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(session.principal, created.principal);
        assert_eq!(session.refresh_token, None);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let (_dir, identity) = identity();
        let registration = Registration::new("Asha", "asha@example.com", "secret1");
        identity.sign_up(&registration).await.unwrap();

        let err = identity.sign_up(&registration).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::EmailAlreadyInUse)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user() {
        let (_dir, identity) = identity();
        identity
            .sign_up(&Registration::new("Asha", "asha@example.com", "secret1"))
            .await
            .unwrap();

        let err = identity
            .sign_in(&Credentials::new("asha@example.com", "nope123"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::WrongPassword)));

        let err = identity
            .sign_in(&Credentials::new("ravi@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn refresh_rejects_forged_token() {
        let (_dir, identity) = identity();
        let mut session = identity
            .sign_up(&Registration::new("Asha", "asha@example.com", "secret1"))
            .await
            .unwrap();

        let refreshed = identity.refresh(&session).await.unwrap();
        assert_eq!(refreshed.principal, session.principal);

        session.id_token = IdToken::new("not json");
        let err = identity.refresh(&session).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    }
}
