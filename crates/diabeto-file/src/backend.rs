use std::path::Path;
use std::sync::Arc;

use diabeto_core::traits::{AuthSession, Backend, DocumentStore, IdentityProvider, ObjectStore};

use crate::documents::FileDocuments;
use crate::identity::FileIdentity;
use crate::objects::FileObjects;
use crate::store::FileStore;

/// Identity, documents and objects rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    identity: FileIdentity,
}

impl FileBackend {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            identity: FileIdentity::new(FileStore::new(root)),
        }
    }

    /// Use a different bcrypt cost for new account hashes.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.identity = self.identity.with_hash_cost(cost);
        self
    }

    pub fn root(&self) -> &Path {
        self.identity.store().root()
    }
}

impl Backend for FileBackend {
    fn identity(&self) -> Arc<dyn IdentityProvider> {
        Arc::new(self.identity.clone())
    }

    fn documents(&self, session: Option<&AuthSession>) -> Arc<dyn DocumentStore> {
        Arc::new(FileDocuments::new(self.identity.clone(), session.cloned()))
    }

    fn objects(&self, session: &AuthSession) -> Arc<dyn ObjectStore> {
        Arc::new(FileObjects::new(self.identity.clone(), session.clone()))
    }
}
