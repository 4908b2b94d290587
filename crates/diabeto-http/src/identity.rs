//! Identity Toolkit REST client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use diabeto_core::error::{AuthError, Error, TransportError};
use diabeto_core::traits::{AuthSession, IdentityProvider};
use diabeto_core::types::UserId;
use diabeto_core::{ApiKey, Credentials, IdToken, RefreshToken, Registration, Result};

use crate::client::RestClient;

const SIGN_UP: &str = "v1/accounts:signUp";
const SIGN_IN: &str = "v1/accounts:signInWithPassword";
const UPDATE: &str = "v1/accounts:update";
const TOKEN: &str = "v1/token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

/// Map a failed identity call into the closed auth error set.
fn map_auth(err: Error) -> Error {
    match err {
        Error::Protocol(p) => match p.message.as_deref() {
            Some(code) => Error::Auth(AuthError::from_code(code)),
            None => Error::Protocol(p),
        },
        Error::Transport(TransportError::Connection { .. } | TransportError::Timeout { .. }) => {
            Error::Auth(AuthError::NetworkRequestFailed)
        }
        other => other,
    }
}

/// Email/password accounts on the hosted identity service.
#[derive(Debug, Clone)]
pub struct RestIdentity {
    accounts: RestClient,
    tokens: RestClient,
    api_key: ApiKey,
}

impl RestIdentity {
    /// `accounts` serves the `accounts:*` methods, `tokens` the refresh
    /// exchange.
    pub fn new(accounts: RestClient, tokens: RestClient, api_key: ApiKey) -> Self {
        Self {
            accounts,
            tokens,
            api_key,
        }
    }

    async fn password_call(&self, method: &str, credentials: &Credentials) -> Result<PasswordResponse> {
        let body = PasswordRequest {
            email: credentials.email(),
            password: credentials.password(),
            return_secure_token: true,
        };
        self.accounts
            .post_json(method, &[("key", self.api_key.as_str())], &body, None)
            .await
            .map_err(map_auth)
    }

    fn session_from(response: PasswordResponse, fallback_email: &str) -> Result<AuthSession> {
        Ok(AuthSession {
            principal: UserId::new(response.local_id)?,
            email: response.email.unwrap_or_else(|| fallback_email.to_string()),
            display_name: response.display_name.filter(|n| !n.is_empty()),
            id_token: IdToken::new(response.id_token),
            refresh_token: response.refresh_token.map(RefreshToken::new),
        })
    }
}

#[async_trait]
impl IdentityProvider for RestIdentity {
    #[instrument(skip(self, registration))]
    async fn sign_up(&self, registration: &Registration) -> Result<AuthSession> {
        let credentials = registration.credentials();
        let created = self.password_call(SIGN_UP, credentials).await?;
        let mut session = Self::session_from(created, credentials.email())?;
        debug!(principal = %session.principal, "account created");

        if registration.name().is_empty() {
            return Ok(session);
        }

        let body = UpdateProfileRequest {
            id_token: session.id_token.as_str(),
            display_name: registration.name(),
            return_secure_token: true,
        };
        let updated: UpdateProfileResponse = self
            .accounts
            .post_json(UPDATE, &[("key", self.api_key.as_str())], &body, None)
            .await
            .map_err(map_auth)?;

        session.display_name = updated
            .display_name
            .or_else(|| Some(registration.name().to_string()));
        if let Some(token) = updated.id_token {
            session.id_token = IdToken::new(token);
        }
        if let Some(token) = updated.refresh_token {
            session.refresh_token = Some(RefreshToken::new(token));
        }
        Ok(session)
    }

    #[instrument(skip(self, credentials))]
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        let response = self.password_call(SIGN_IN, credentials).await?;
        Self::session_from(response, credentials.email())
    }

    #[instrument(skip(self, session), fields(principal = %session.principal))]
    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession> {
        let refresh_token = session
            .refresh_token
            .as_ref()
            .ok_or(Error::Auth(AuthError::SessionExpired))?;

        let body = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: refresh_token.as_str(),
        };
        let response: RefreshResponse = self
            .tokens
            .post_json(TOKEN, &[("key", self.api_key.as_str())], &body, None)
            .await
            .map_err(map_auth)?;

        Ok(AuthSession {
            principal: UserId::new(response.user_id)?,
            email: session.email.clone(),
            display_name: session.display_name.clone(),
            id_token: IdToken::new(response.id_token),
            refresh_token: Some(RefreshToken::new(response.refresh_token)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diabeto_core::error::ProtocolError;

    #[test]
    fn provider_codes_become_auth_errors() {
        let err = map_auth(Error::Protocol(ProtocolError::new(
            400,
            Some("INVALID_ARGUMENT".to_string()),
            Some("EMAIL_EXISTS".to_string()),
        )));
        assert!(matches!(err, Error::Auth(AuthError::EmailAlreadyInUse)));

        let err = map_auth(Error::Protocol(ProtocolError::new(
            400,
            None,
            Some("WEAK_PASSWORD : Password should be at least 6 characters".to_string()),
        )));
        assert!(matches!(err, Error::Auth(AuthError::WeakPassword)));
    }

    #[test]
    fn connection_failure_is_network_error() {
        let err = map_auth(Error::Transport(TransportError::Connection {
            message: "refused".to_string(),
        }));
        assert!(matches!(err, Error::Auth(AuthError::NetworkRequestFailed)));
    }
}
