//! Object store path type.

use std::fmt;

use chrono::{DateTime, Utc};

use super::UserId;
use crate::error::{Error, InvalidInputError};

/// A validated path inside the object store bucket.
///
/// Paths are relative, slash-separated, and never contain empty, `.` or `..`
/// segments, so the filesystem backend can map them straight onto disk.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use diabeto_core::{ObjectPath, UserId};
///
/// let uid = UserId::new("u1").unwrap();
/// let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// let path = ObjectPath::scan_image(&uid, at);
/// assert_eq!(path.as_str(), "images/u1/1700000000123.jpg");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Create an object path, validating its segments.
    ///
    /// # Errors
    ///
    /// Returns an error for absolute paths or empty/relative segments.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        let bad = s.is_empty()
            || s.split('/')
                .any(|seg| seg.is_empty() || seg == "." || seg == ".." || seg.contains('\\'));
        if bad {
            return Err(InvalidInputError::ObjectPath {
                value: s,
                reason: "must be a relative path with non-empty segments".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// The upload path for a scanned image: `images/{uid}/{millis}.jpg`.
    pub fn scan_image(user: &UserId, at: DateTime<Utc>) -> Self {
        Self(format!(
            "images/{}/{}.jpg",
            user.as_str(),
            at.timestamp_millis()
        ))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
