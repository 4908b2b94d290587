//! Device-local key-value storage trait.

use async_trait::async_trait;

use crate::Result;

/// Plain string key-value storage private to one device.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read a value, `None` if unset.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write `value` unless it is already stored, as one atomic step.
    /// Returns `true` when the stored value changed.
    async fn set_if_changed(&self, key: &str, value: &str) -> Result<bool>;

    /// Remove a value. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
