//! Browsing a principal's scan history.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::context::ClientContext;
use crate::document::OrderBy;
use crate::error::{AuthError, Error};
use crate::model::HistoryRecord;
use crate::model::history::FIELD_CREATED_AT;
use crate::traits::{Announcer, AuthSession, DocumentStore, Language};
use crate::types::{CollectionPath, DocumentId};
use crate::Result;

/// A locally held, newest-first view of one principal's history.
pub struct HistoryBrowser {
    documents: Arc<dyn DocumentStore>,
    announcer: Option<Arc<dyn Announcer>>,
    collection: CollectionPath,
    records: Vec<HistoryRecord>,
}

impl HistoryBrowser {
    /// Open an empty browser for the signed-in principal.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::NotAuthenticated`] when `session` is `None`.
    pub fn open(ctx: &ClientContext, session: Option<&AuthSession>) -> Result<Self> {
        let session = session.ok_or(Error::Auth(AuthError::NotAuthenticated))?;
        Ok(Self {
            documents: ctx.backend().documents(Some(session)),
            announcer: ctx.announcer().cloned(),
            collection: ctx.history_collection().path_for(&session.principal)?,
            records: Vec::new(),
        })
    }

    /// The records from the last successful refresh, newest first.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Find a record by id.
    pub fn find(&self, id: &DocumentId) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Re-fetch the whole collection ordered by `createdAt` descending.
    ///
    /// Documents that do not decode as history records are skipped. On
    /// failure the previous list is kept.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn refresh(&mut self) -> Result<&[HistoryRecord]> {
        let docs = self
            .documents
            .list(&self.collection, &OrderBy::descending(FIELD_CREATED_AT))
            .await?;

        self.records = docs
            .iter()
            .filter_map(|doc| match HistoryRecord::from_document(doc) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(path = %doc.path, error = %err, "skipping malformed history record");
                    None
                }
            })
            .collect();
        debug!(count = self.records.len(), "history refreshed");
        Ok(&self.records)
    }

    /// Delete a record on the server, then drop it from the local list.
    ///
    /// # Errors
    ///
    /// Returns the store error; the local list is unchanged in that case.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete(&mut self, id: &DocumentId) -> Result<()> {
        self.documents.delete(&self.collection.doc(id)).await?;
        self.records.retain(|r| &r.id != id);
        debug!(%id, "history record deleted");
        Ok(())
    }

    /// Share a record's English text. Failures are logged, never returned.
    pub async fn share(&self, id: &DocumentId) {
        let Some((record, announcer)) = self.target(id) else {
            return;
        };
        if let Err(err) = announcer.share(&record.response).await {
            warn!(%id, error = %err, "share failed");
        }
    }

    /// Read a record aloud. Failures are logged, never returned.
    ///
    /// Hindi speech uses the Hindi response when the record has one.
    pub async fn speak(&self, id: &DocumentId, language: Language) {
        let Some((record, announcer)) = self.target(id) else {
            return;
        };
        let text = match language {
            Language::English => record.response.as_str(),
            Language::Hindi => record.hindi_or_english(),
        };
        if let Err(err) = announcer.speak(text, language).await {
            warn!(%id, error = %err, "speech failed");
        }
    }

    fn target(&self, id: &DocumentId) -> Option<(&HistoryRecord, &Arc<dyn Announcer>)> {
        let Some(record) = self.find(id) else {
            warn!(%id, "no such history record");
            return None;
        };
        let Some(announcer) = self.announcer.as_ref() else {
            warn!("no announcer configured");
            return None;
        };
        Some((record, announcer))
    }
}
