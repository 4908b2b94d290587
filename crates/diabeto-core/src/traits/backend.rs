//! Backend abstraction.
//!
//! A backend bundles one identity provider with the document and object
//! stores that trust its tokens, so network and filesystem implementations
//! can be swapped as a unit.

use std::sync::Arc;

use super::{AuthSession, DocumentStore, IdentityProvider, ObjectStore};

/// A set of managed services sharing one identity provider.
pub trait Backend: Send + Sync {
    /// The identity provider.
    fn identity(&self) -> Arc<dyn IdentityProvider>;

    /// A document store acting as `session`, or anonymously when `None`.
    fn documents(&self, session: Option<&AuthSession>) -> Arc<dyn DocumentStore>;

    /// An object store acting as `session`.
    fn objects(&self, session: &AuthSession) -> Arc<dyn ObjectStore>;
}
