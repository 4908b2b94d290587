//! Identity provider trait.

use async_trait::async_trait;

use crate::types::UserId;
use crate::{Credentials, IdToken, RefreshToken, Registration, Result};

/// An authenticated principal and the tokens that prove it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The principal; all per-user data is namespaced under it.
    pub principal: UserId,
    /// The account email.
    pub email: String,
    /// The display name set at registration, if any.
    pub display_name: Option<String>,
    /// Token for authenticated store requests.
    pub id_token: IdToken,
    /// Token for obtaining a new id token, if the provider issues one.
    pub refresh_token: Option<RefreshToken>,
}

/// An email/password identity provider.
///
/// Implementations map every provider failure code into
/// [`AuthError`](crate::AuthError) with [`AuthError::from_code`](crate::AuthError::from_code).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and set its display name.
    async fn sign_up(&self, registration: &Registration) -> Result<AuthSession>;

    /// Sign in with email and password.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession>;

    /// Exchange the refresh token for a fresh session.
    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession>;
}
