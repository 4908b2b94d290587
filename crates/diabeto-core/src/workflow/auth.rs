//! Account registration and sign-in.
//!
//! Forms are validated locally before the identity provider is contacted.

use tracing::{debug, instrument};

use crate::context::ClientContext;
use crate::traits::AuthSession;
use crate::{Credentials, Registration, Result};

/// Validate the registration form and create the account.
///
/// # Errors
///
/// Returns [`Error::Validation`](crate::Error::Validation) for an invalid
/// form, or the mapped provider error.
#[instrument(skip(ctx, registration), fields(email = %registration.credentials().email()))]
pub async fn register(ctx: &ClientContext, registration: &Registration) -> Result<AuthSession> {
    registration.validate()?;
    let session = ctx.backend().identity().sign_up(registration).await?;
    debug!(principal = %session.principal, "account created");
    Ok(session)
}

/// Validate the login form and sign in.
///
/// # Errors
///
/// Returns [`Error::Validation`](crate::Error::Validation) for an invalid
/// form, or the mapped provider error.
#[instrument(skip(ctx, credentials), fields(email = %credentials.email()))]
pub async fn sign_in(ctx: &ClientContext, credentials: &Credentials) -> Result<AuthSession> {
    credentials.validate()?;
    let session = ctx.backend().identity().sign_in(credentials).await?;
    debug!(principal = %session.principal, "signed in");
    Ok(session)
}

/// Exchange the session's refresh token for new tokens.
pub async fn refresh(ctx: &ClientContext, session: &AuthSession) -> Result<AuthSession> {
    ctx.backend().identity().refresh(session).await
}
