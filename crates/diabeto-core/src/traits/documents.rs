//! Document store trait.

use async_trait::async_trait;

use crate::document::{OrderBy, StoredDocument, WriteFields};
use crate::types::{CollectionPath, DocumentId, DocumentPath};
use crate::Result;

/// A hierarchical document store with per-field atomic writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a new document with a store-assigned id.
    async fn add(&self, collection: &CollectionPath, fields: &WriteFields) -> Result<DocumentId>;

    /// List every document in a collection in the given order.
    ///
    /// Documents lacking the order field are omitted.
    async fn list(&self, collection: &CollectionPath, order: &OrderBy)
    -> Result<Vec<StoredDocument>>;

    /// Get a single document, `None` if it does not exist.
    async fn get(&self, path: &DocumentPath) -> Result<Option<StoredDocument>>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<()>;

    /// Create or update a document, touching only the written fields.
    async fn merge(&self, path: &DocumentPath, fields: &WriteFields) -> Result<()>;
}
