//! Form validation for the sign-in and registration flows.

use std::collections::BTreeMap;
use std::fmt;

use crate::Result;

/// Minimum password length accepted by the forms.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum trimmed display-name length accepted by the forms.
pub const MIN_NAME_LEN: usize = 2;

/// Field name to message map produced by form validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// Record a message for a field. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Returns the message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns true if no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors wrapped in [`crate::Error`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Returns true if `email` has the shape `local@domain.tld` with no whitespace.
///
/// # Example
///
/// ```
/// use diabeto_core::validation::is_valid_email;
///
/// assert!(is_valid_email("alice@example.com"));
/// assert!(!is_valid_email("alice@example"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Domain needs a dot with something on both sides of at least one of them.
    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

pub(crate) fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email.trim()) {
        errors.add("email", "Please enter a valid email address");
    }
}

pub(crate) fn check_password(errors: &mut ValidationErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }
}

pub(crate) fn check_name(errors: &mut ValidationErrors, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        errors.add("name", "Full name is required");
    } else if name.chars().count() < MIN_NAME_LEN {
        errors.add("name", "Name must be at least 2 characters");
    }
}
