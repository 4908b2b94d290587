//! Principal identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Longest identifier the identity provider hands out.
const MAX_LEN: usize = 128;

/// The validated identifier of an authenticated principal.
///
/// All per-user data is namespaced under this id, so it must be usable as a
/// single document path segment and as an object path segment.
///
/// # Example
///
/// ```
/// use diabeto_core::UserId;
///
/// let uid = UserId::new("kTnB0b6xZ3gN2Pq").unwrap();
/// assert_eq!(uid.as_str(), "kTnB0b6xZ3gN2Pq");
/// assert!(UserId::new("a/b").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new user id, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, too long, or contains characters
    /// that cannot appear in a path segment.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let reason = if s.is_empty() {
            Some("cannot be empty")
        } else if s.len() > MAX_LEN {
            Some("must be at most 128 bytes")
        } else if s == "." || s == ".." {
            Some("cannot be '.' or '..'")
        } else if !s
            .chars()
            .all(|c| c.is_ascii_graphic() && c != '/' && c != '\\')
        {
            Some("must be printable ASCII without path separators")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidInputError::UserId {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_provider_style_ids() {
        assert!(UserId::new("3F2nQ8vZyXcKp1LmT0aBsD9eWh42").is_ok());
        assert!(UserId::new("u_7c3e-local").is_ok());
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("..").is_err());
        assert!(UserId::new("a b").is_err());
        assert!(UserId::new("a/b").is_err());
        assert!(UserId::new("x".repeat(129)).is_err());
    }

    #[test]
    fn serde_validates() {
        let ok: UserId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(ok.as_str(), "abc123");
        assert!(serde_json::from_str::<UserId>("\"a/b\"").is_err());
    }
}
