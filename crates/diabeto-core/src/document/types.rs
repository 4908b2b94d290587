//! Document store operation types.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::{Document, FieldValue};
use crate::types::{DocumentId, DocumentPath};

/// A document read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The full path of this document.
    pub path: DocumentPath,

    /// The document's fields.
    pub fields: Document,

    /// When the store created the document, if it reports it.
    pub create_time: Option<DateTime<Utc>>,
}

impl StoredDocument {
    /// Returns the document's id within its collection.
    pub fn id(&self) -> DocumentId {
        self.path.id()
    }
}

/// Sort direction for ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Ordering for [`DocumentStore::list`](crate::DocumentStore::list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field to sort on.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Sort descending by `field`.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Sort ascending by `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    /// Order documents in place the way the hosted store does: documents
    /// lacking the field are dropped, ties break on document path.
    pub fn apply(&self, docs: &mut Vec<StoredDocument>) {
        docs.retain(|d| d.fields.get(&self.field).is_some());
        docs.sort_by(|a, b| {
            let ord = match (a.fields.get(&self.field), b.fields.get(&self.field)) {
                (Some(x), Some(y)) => compare_values(x, y),
                _ => Ordering::Equal,
            }
            .then_with(|| a.path.as_str().cmp(b.path.as_str()));
            match self.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }
}

/// Cross-type ordering: null < bool < number < timestamp < string.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    fn rank(v: &FieldValue) -> u8 {
        match v {
            FieldValue::NullValue(()) => 0,
            FieldValue::BooleanValue(_) => 1,
            FieldValue::IntegerValue(_) | FieldValue::DoubleValue(_) => 2,
            FieldValue::TimestampValue(_) => 3,
            FieldValue::StringValue(_) => 4,
        }
    }

    match (a, b) {
        (FieldValue::BooleanValue(x), FieldValue::BooleanValue(y)) => x.cmp(y),
        (FieldValue::IntegerValue(x), FieldValue::IntegerValue(y)) => x.cmp(y),
        (FieldValue::DoubleValue(x), FieldValue::DoubleValue(y)) => x.total_cmp(y),
        (FieldValue::IntegerValue(x), FieldValue::DoubleValue(y)) => (*x as f64).total_cmp(y),
        (FieldValue::DoubleValue(x), FieldValue::IntegerValue(y)) => x.total_cmp(&(*y as f64)),
        (FieldValue::TimestampValue(x), FieldValue::TimestampValue(y)) => x.cmp(y),
        (FieldValue::StringValue(x), FieldValue::StringValue(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A random 20-character document id, generated client-side the way hosted
/// stores assign ids for `add`.
pub fn auto_id() -> DocumentId {
    let mut rng = rand::thread_rng();
    let id: String = (0..20)
        .map(|_| AUTO_ID_ALPHABET[rng.gen_range(0..AUTO_ID_ALPHABET.len())] as char)
        .collect();
    DocumentId(id)
}
