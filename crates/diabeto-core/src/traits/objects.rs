//! Object store trait.

use async_trait::async_trait;

use crate::types::ObjectPath;
use crate::Result;

/// A write-once binary object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`.
    async fn upload(&self, path: &ObjectPath, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Resolve a URL from which the object at `path` can be fetched.
    async fn download_url(&self, path: &ObjectPath) -> Result<String>;
}
