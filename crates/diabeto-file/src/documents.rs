//! File-backed document store.

use async_trait::async_trait;
use tracing::{debug, instrument};

use diabeto_core::document::{OrderBy, StoredDocument, WriteFields};
use diabeto_core::error::{AuthError, Error, ProtocolError};
use diabeto_core::traits::{AuthSession, DocumentStore};
use diabeto_core::types::{CollectionPath, DocumentId, DocumentPath};
use diabeto_core::Result;

use crate::identity::FileIdentity;

/// Document store acting as one session, or anonymously.
///
/// Anything under `users/{uid}` is readable and writable only by `uid`;
/// every other top-level collection is open.
#[derive(Debug, Clone)]
pub struct FileDocuments {
    identity: FileIdentity,
    session: Option<AuthSession>,
}

impl FileDocuments {
    pub fn new(identity: FileIdentity, session: Option<AuthSession>) -> Self {
        Self { identity, session }
    }

    fn ensure_access<'a>(&self, mut segments: impl Iterator<Item = &'a str>) -> Result<()> {
        if segments.next() != Some("users") {
            return Ok(());
        }
        let Some(owner) = segments.next() else {
            return Ok(());
        };

        let session = self
            .session
            .as_ref()
            .ok_or(Error::Auth(AuthError::NotAuthenticated))?;
        let account = self.identity.validate_token(&session.id_token)?;

        if account.uid != owner {
            return Err(Error::Protocol(ProtocolError::new(
                403,
                Some("PERMISSION_DENIED".to_string()),
                Some("Missing or insufficient permissions.".to_string()),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocuments {
    #[instrument(skip(self, fields), fields(%collection))]
    async fn add(&self, collection: &CollectionPath, fields: &WriteFields) -> Result<DocumentId> {
        debug!("adding document");
        self.ensure_access(collection.segments())?;
        self.identity.store().add_document(collection, fields)
    }

    #[instrument(skip(self), fields(%collection))]
    async fn list(
        &self,
        collection: &CollectionPath,
        order: &OrderBy,
    ) -> Result<Vec<StoredDocument>> {
        debug!("listing documents");
        self.ensure_access(collection.segments())?;
        self.identity.store().list_documents(collection, order)
    }

    #[instrument(skip(self), fields(%path))]
    async fn get(&self, path: &DocumentPath) -> Result<Option<StoredDocument>> {
        self.ensure_access(path.segments())?;
        self.identity.store().get_document(path)
    }

    #[instrument(skip(self), fields(%path))]
    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        self.ensure_access(path.segments())?;
        self.identity.store().delete_document(path)
    }

    #[instrument(skip(self, fields), fields(%path))]
    async fn merge(&self, path: &DocumentPath, fields: &WriteFields) -> Result<()> {
        self.ensure_access(path.segments())?;
        self.identity.store().merge_document(path, fields)
    }
}
