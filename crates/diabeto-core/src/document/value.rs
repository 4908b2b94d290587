//! Typed document fields and field writes.
//!
//! Values serialize in the tagged form used by the hosted document store's
//! REST API (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...), so the
//! same types work for the filesystem backend and the wire.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};

/// A single typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    /// Explicit null.
    NullValue(()),
    /// Boolean.
    BooleanValue(bool),
    /// 64-bit integer, carried as a decimal string on the wire.
    #[serde(with = "int_string")]
    IntegerValue(i64),
    /// Double-precision float.
    DoubleValue(f64),
    /// UTC timestamp (RFC 3339 on the wire).
    TimestampValue(DateTime<Utc>),
    /// UTF-8 string.
    StringValue(String),
}

impl FieldValue {
    /// Returns the string if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::IntegerValue(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a timestamp value.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::TimestampValue(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::StringValue(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::StringValue(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::IntegerValue(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::BooleanValue(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::TimestampValue(t)
    }
}

mod int_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(n),
        }
    }
}

/// The fields of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, FieldValue>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Get a required string field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or not a string.
    pub fn require_str(&self, field: &str) -> Result<&str, Error> {
        self.get(field)
            .and_then(FieldValue::as_str)
            .ok_or_else(|| missing(field, "expected a string"))
    }

    /// Get a required timestamp field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or not a timestamp.
    pub fn require_timestamp(&self, field: &str) -> Result<DateTime<Utc>, Error> {
        self.get(field)
            .and_then(FieldValue::as_timestamp)
            .ok_or_else(|| missing(field, "expected a timestamp"))
    }

    /// Get an optional string field.
    pub fn optional_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    /// Get an integer field, treating absent or non-integer values as zero.
    pub fn counter(&self, field: &str) -> i64 {
        self.get(field).and_then(FieldValue::as_i64).unwrap_or(0)
    }

    /// Apply field writes in place, resolving server values against `now`.
    ///
    /// Increments add to an existing integer; a missing or non-integer field
    /// is replaced by the increment itself.
    pub fn apply(&mut self, writes: &WriteFields, now: DateTime<Utc>) {
        for (field, write) in writes.iter() {
            let value = match write {
                FieldWrite::Value(v) => v.clone(),
                FieldWrite::ServerTimestamp => FieldValue::TimestampValue(now),
                FieldWrite::Increment(by) => {
                    let current = self.get(field).and_then(FieldValue::as_i64).unwrap_or(0);
                    FieldValue::IntegerValue(current.saturating_add(*by))
                }
            };
            self.0.insert(field.clone(), value);
        }
    }
}

impl FromIterator<(String, FieldValue)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn missing(field: &str, reason: &str) -> Error {
    Error::InvalidInput(InvalidInputError::Field {
        field: field.to_string(),
        reason: reason.to_string(),
    })
}

/// One write to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Store the value as given.
    Value(FieldValue),
    /// Store the store's own commit time.
    ServerTimestamp,
    /// Atomically add to the stored integer.
    Increment(i64),
}

/// An ordered set of field writes for one document.
///
/// # Example
///
/// ```
/// use diabeto_core::{FieldWrite, WriteFields};
///
/// let writes = WriteFields::new()
///     .set("date", "2025-01-31")
///     .increment("totalVisits", 1)
///     .server_timestamp("lastUpdated");
/// assert_eq!(writes.get("totalVisits"), Some(&FieldWrite::Increment(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteFields(BTreeMap<String, FieldWrite>);

impl WriteFields {
    /// Create an empty set of writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), FieldWrite::Value(value.into()));
        self
    }

    /// Set a field to the server's commit time.
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), FieldWrite::ServerTimestamp);
        self
    }

    /// Atomically increment an integer field.
    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.0.insert(field.into(), FieldWrite::Increment(by));
        self
    }

    /// Get the write for a field.
    pub fn get(&self, field: &str) -> Option<&FieldWrite> {
        self.0.get(field)
    }

    /// Iterate over the writes in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldWrite)> {
        self.0.iter()
    }

    /// Returns true if there are no writes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Materialize the writes as a fresh document.
    pub fn to_document(&self, now: DateTime<Utc>) -> Document {
        let mut doc = Document::new();
        doc.apply(self, now);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn wire_format_matches_rest_encoding() {
        let mut doc = Document::new();
        doc.insert("response", "Green - safe");
        doc.insert("count", 3_i64);
        doc.insert("createdAt", t0());

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "count": {"integerValue": "3"},
                "createdAt": {"timestampValue": "2025-03-01T12:00:00Z"},
                "response": {"stringValue": "Green - safe"}
            })
        );
    }

    #[test]
    fn integer_accepts_number_or_string() {
        let a: FieldValue = serde_json::from_value(json!({"integerValue": "7"})).unwrap();
        let b: FieldValue = serde_json::from_value(json!({"integerValue": 7})).unwrap();
        assert_eq!(a, FieldValue::IntegerValue(7));
        assert_eq!(a, b);
    }

    #[test]
    fn null_value_round_trips() {
        let v: FieldValue = serde_json::from_value(json!({"nullValue": null})).unwrap();
        assert_eq!(v, FieldValue::NullValue(()));
    }

    #[test]
    fn apply_increments_and_timestamps() {
        let mut doc = Document::new();
        doc.insert("totalVisits", 4_i64);
        doc.insert("note", "x");

        let writes = WriteFields::new()
            .increment("totalVisits", 1)
            .increment("uniqueVisitors", 1)
            .increment("note", 2)
            .server_timestamp("lastUpdated");
        doc.apply(&writes, t0());

        assert_eq!(doc.counter("totalVisits"), 5);
        assert_eq!(doc.counter("uniqueVisitors"), 1);
        assert_eq!(doc.counter("note"), 2);
        assert_eq!(doc.require_timestamp("lastUpdated").unwrap(), t0());
    }

    #[test]
    fn require_reports_field() {
        let doc = Document::new();
        let err = doc.require_str("image").unwrap_err();
        assert!(err.to_string().contains("image"));
    }
}
