//! Document store field model.
//!
//! This module defines the typed values stored in documents and the write
//! operations (plain values, server timestamps, atomic increments) applied to
//! them. The actual operations are methods on
//! [`DocumentStore`](crate::DocumentStore).

mod types;
mod value;

pub use types::{Direction, OrderBy, StoredDocument, auto_id};
pub use value::{Document, FieldValue, FieldWrite, WriteFields};
