//! Document store addressing types.
//!
//! The document store is a tree of alternating collections and documents:
//! `users` (collection) / `{uid}` (document) / `history` (collection) /
//! `{id}` (document). A collection path therefore has an odd number of
//! segments and a document path an even number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UserId;
use crate::error::{Error, InvalidInputError};

/// Longest segment the hosted document store accepts.
const MAX_SEGMENT_LEN: usize = 1500;

fn check_segment(path: &str, segment: &str) -> Result<(), Error> {
    let reason = if segment.is_empty() {
        Some("segments cannot be empty")
    } else if segment == "." || segment == ".." {
        Some("segments cannot be '.' or '..'")
    } else if segment.len() > MAX_SEGMENT_LEN {
        Some("segments must be at most 1500 bytes")
    } else if segment.starts_with("__") && segment.ends_with("__") {
        Some("segments matching __.*__ are reserved")
    } else if segment.contains('\\') || segment.chars().any(char::is_control) {
        Some("segments cannot contain backslashes or control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InvalidInputError::DocumentPath {
            value: path.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

fn parse_segments(path: &str, want_odd: bool) -> Result<(), Error> {
    let segments: Vec<&str> = path.split('/').collect();
    for segment in &segments {
        check_segment(path, segment)?;
    }
    if (segments.len() % 2 == 1) != want_odd {
        let reason = if want_odd {
            "collection paths must have an odd number of segments"
        } else {
            "document paths must have an even number of segments"
        };
        return Err(InvalidInputError::DocumentPath {
            value: path.to_string(),
            reason: reason.to_string(),
        }
        .into());
    }
    Ok(())
}

/// The id of a single document within its collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(pub(crate) String);

impl DocumentId {
    /// Create a new document id, validating it is a single path segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, reserved, or contains a `/`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.contains('/') {
            return Err(InvalidInputError::DocumentPath {
                value: s,
                reason: "document ids cannot contain '/'".to_string(),
            }
            .into());
        }
        check_segment(&s, &s)?;
        Ok(Self(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

/// A validated path to a collection.
///
/// # Example
///
/// ```
/// use diabeto_core::{CollectionPath, UserId};
///
/// let uid = UserId::new("abc").unwrap();
/// let history = CollectionPath::user_scoped(&uid, "history").unwrap();
/// assert_eq!(history.as_str(), "users/abc/history");
/// assert_eq!(history.collection_id(), "history");
/// assert_eq!(history.parent().unwrap().as_str(), "users/abc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Create a collection path from a slash-separated string.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is invalid or the segment count is even.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        parse_segments(&s, true)?;
        Ok(Self(s))
    }

    /// The collection `users/{uid}/{name}` belonging to a principal.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid segment.
    pub fn user_scoped(user: &UserId, name: &str) -> Result<Self, Error> {
        Self::new(format!("users/{}/{}", user.as_str(), name))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment, the collection's own id.
    pub fn collection_id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the document this collection is nested under, if any.
    pub fn parent(&self) -> Option<DocumentPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| DocumentPath(parent.to_string()))
    }

    /// Returns the path of a document in this collection.
    pub fn doc(&self, id: &DocumentId) -> DocumentPath {
        DocumentPath(format!("{}/{}", self.0, id.as_str()))
    }

    /// Returns the segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A validated path to a single document.
///
/// # Example
///
/// ```
/// use diabeto_core::DocumentPath;
///
/// let stats = DocumentPath::new("app_stats/visitor_stats").unwrap();
/// assert_eq!(stats.id().as_str(), "visitor_stats");
/// assert_eq!(stats.collection().as_str(), "app_stats");
/// assert!(DocumentPath::new("app_stats").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Create a document path from a slash-separated string.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment is invalid or the segment count is odd.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        parse_segments(&s, false)?;
        Ok(Self(s))
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the document's id (the last segment).
    pub fn id(&self) -> DocumentId {
        let id = self.0.rsplit('/').next().unwrap_or(&self.0);
        DocumentId(id.to_string())
    }

    /// Returns the collection holding this document.
    pub fn collection(&self) -> CollectionPath {
        let parent = self
            .0
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or_default();
        CollectionPath(parent.to_string())
    }

    /// Returns a sub-collection below this document.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid segment.
    pub fn child(&self, name: &str) -> Result<CollectionPath, Error> {
        CollectionPath::new(format!("{}/{}", self.0, name))
    }

    /// Returns the segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_and_document_parity() {
        assert!(CollectionPath::new("visitors").is_ok());
        assert!(CollectionPath::new("users/u1/history").is_ok());
        assert!(CollectionPath::new("users/u1").is_err());
        assert!(DocumentPath::new("users/u1").is_ok());
        assert!(DocumentPath::new("users/u1/history").is_err());
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(CollectionPath::new("users//history").is_err());
        assert!(CollectionPath::new("/visitors").is_err());
        assert!(DocumentPath::new("visitors/__id__").is_err());
        assert!(DocumentPath::new("visitors/..").is_err());
        assert!(DocumentId::new("a/b").is_err());
    }

    #[test]
    fn doc_and_back() {
        let col = CollectionPath::new("users/u1/history").unwrap();
        let id = DocumentId::new("rec42").unwrap();
        let doc = col.doc(&id);
        assert_eq!(doc.as_str(), "users/u1/history/rec42");
        assert_eq!(doc.id(), id);
        assert_eq!(doc.collection(), col);
    }

    #[test]
    fn top_level_collection_has_no_parent() {
        let col = CollectionPath::new("daily_stats").unwrap();
        assert!(col.parent().is_none());
        assert_eq!(col.collection_id(), "daily_stats");
    }

    #[test]
    fn child_collection() {
        let doc = DocumentPath::new("users/u1").unwrap();
        assert_eq!(doc.child("history1").unwrap().as_str(), "users/u1/history1");
    }
}
