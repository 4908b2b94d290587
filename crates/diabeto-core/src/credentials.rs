//! Sign-in and registration credentials.

use std::fmt;

use crate::Result;
use crate::validation::{self, ValidationErrors};

/// Email/password credentials for signing in.
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use diabeto_core::Credentials;
///
/// let creds = Credentials::new("  alice@example.com ", "secret123");
/// assert_eq!(creds.email(), "alice@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials. The email is trimmed; the password is kept as is.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// Use this only when constructing authentication requests.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Check the sign-in form rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) listing every
    /// failing field.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::default();
        validation::check_email(&mut errors, &self.email);
        validation::check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Details for creating a new account.
#[derive(Clone)]
pub struct Registration {
    name: String,
    credentials: Credentials,
}

impl Registration {
    /// Create a new registration. The display name is trimmed.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            credentials: Credentials::new(email, password),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email/password pair.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Check the registration form rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) listing every
    /// failing field.
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::default();
        validation::check_name(&mut errors, &self.name);
        validation::check_email(&mut errors, self.credentials.email());
        validation::check_password(&mut errors, self.credentials.password());
        errors.into_result()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("credentials", &self.credentials)
            .finish()
    }
}
