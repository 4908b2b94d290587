//! Explicit client context.
//!
//! Every collaborator a workflow needs is handed in here once at startup
//! instead of being reached through process-wide handles.

use std::sync::Arc;

use crate::error::{Error, InvalidInputError};
use crate::model::HistoryCollection;
use crate::traits::{Announcer, Backend, Classifier, LocalStore};
use crate::Result;

/// Collaborators shared by all workflows.
#[derive(Clone)]
pub struct ClientContext {
    backend: Arc<dyn Backend>,
    local: Arc<dyn LocalStore>,
    classifier: Option<Arc<dyn Classifier>>,
    announcer: Option<Arc<dyn Announcer>>,
    history: HistoryCollection,
    translate: bool,
}

impl ClientContext {
    /// Create a context over a backend and device storage.
    pub fn new(backend: Arc<dyn Backend>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            backend,
            local,
            classifier: None,
            announcer: None,
            history: HistoryCollection::default(),
            translate: false,
        }
    }

    /// Set the inference client used by the scan pipeline.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the share/speech output used by the history browser.
    pub fn with_announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Select the history collection.
    pub fn with_history_collection(mut self, history: HistoryCollection) -> Self {
        self.history = history;
        self
    }

    /// Also store a Hindi translation of each classification.
    pub fn with_translation(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn local(&self) -> &Arc<dyn LocalStore> {
        &self.local
    }

    /// The inference client.
    ///
    /// # Errors
    ///
    /// Returns an error if none was configured.
    pub fn classifier(&self) -> Result<&Arc<dyn Classifier>> {
        self.classifier.as_ref().ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::Other {
                message: "no inference client configured".to_string(),
            })
        })
    }

    pub fn announcer(&self) -> Option<&Arc<dyn Announcer>> {
        self.announcer.as_ref()
    }

    pub fn history_collection(&self) -> HistoryCollection {
        self.history
    }

    pub fn translate(&self) -> bool {
        self.translate
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("classifier", &self.classifier.is_some())
            .field("announcer", &self.announcer.is_some())
            .field("history", &self.history)
            .field("translate", &self.translate)
            .finish_non_exhaustive()
    }
}
