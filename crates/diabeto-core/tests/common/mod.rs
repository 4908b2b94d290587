//! In-memory service fakes shared by the workflow tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use diabeto_core::document::OrderBy;
use diabeto_core::error::{ProtocolError, TransportError};
use diabeto_core::traits::Language;
use diabeto_core::workflow::EncodedImage;
use diabeto_core::{
    Announcer, AuthSession, Backend, Classifier, ClientContext, CollectionPath, Credentials,
    Document, DocumentId, DocumentPath, DocumentStore, Error, IdToken, IdentityProvider,
    LocalStore, ObjectPath, ObjectStore, Registration, Result, StoredDocument, UserId,
    WriteFields,
};

pub fn offline() -> Error {
    Error::Transport(TransportError::Connection {
        message: "offline".to_string(),
    })
}

pub fn session(uid: &str) -> AuthSession {
    AuthSession {
        principal: UserId::new(uid).unwrap(),
        email: format!("{uid}@example.com"),
        display_name: None,
        id_token: IdToken::new("token"),
        refresh_token: None,
    }
}

/// Document store whose clock advances one second per write.
#[derive(Default)]
pub struct MemoryDocuments {
    docs: Mutex<BTreeMap<String, StoredDocument>>,
    ticks: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryDocuments {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) as i64;
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(tick)
    }

    pub fn document(&self, path: &str) -> Option<Document> {
        self.docs.lock().unwrap().get(path).map(|d| d.fields.clone())
    }

    pub fn count_in(&self, collection: &str) -> usize {
        self.docs
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.path.collection().as_str() == collection)
            .count()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn add(&self, collection: &CollectionPath, fields: &WriteFields) -> Result<DocumentId> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(offline());
        }
        let now = self.now();
        let id = DocumentId::new(format!("doc{}", now.timestamp())).unwrap();
        let path = collection.doc(&id);
        let doc = StoredDocument {
            path: path.clone(),
            fields: fields.to_document(now),
            create_time: Some(now),
        };
        self.docs.lock().unwrap().insert(path.as_str().to_string(), doc);
        Ok(id)
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        order: &OrderBy,
    ) -> Result<Vec<StoredDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(offline());
        }
        let mut docs: Vec<StoredDocument> = self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.path.collection() == *collection)
            .cloned()
            .collect();
        order.apply(&mut docs);
        Ok(docs)
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<StoredDocument>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(offline());
        }
        Ok(self.docs.lock().unwrap().get(path.as_str()).cloned())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Protocol(ProtocolError::new(
                503,
                Some("UNAVAILABLE".to_string()),
                None,
            )));
        }
        self.docs.lock().unwrap().remove(path.as_str());
        Ok(())
    }

    async fn merge(&self, path: &DocumentPath, fields: &WriteFields) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(offline());
        }
        let now = self.now();
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .entry(path.as_str().to_string())
            .or_insert_with(|| StoredDocument {
                path: path.clone(),
                fields: Document::new(),
                create_time: Some(now),
            });
        doc.fields.apply(fields, now);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryObjects {
    pub blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn upload(&self, path: &ObjectPath, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(path.as_str().to_string(), bytes);
        Ok(())
    }

    async fn download_url(&self, path: &ObjectPath) -> Result<String> {
        Ok(format!("mem://{path}"))
    }
}

#[derive(Default)]
pub struct MemoryIdentity {
    pub calls: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, registration: &Registration) -> Result<AuthSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut s = session("new-user");
        s.display_name = Some(registration.name().to_string());
        Ok(s)
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<AuthSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(session("u1"))
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession> {
        Ok(session.clone())
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    pub identity: Arc<MemoryIdentity>,
    pub documents: Arc<MemoryDocuments>,
    pub objects: Arc<MemoryObjects>,
}

impl Backend for MemoryBackend {
    fn identity(&self) -> Arc<dyn IdentityProvider> {
        self.identity.clone()
    }

    fn documents(&self, _session: Option<&AuthSession>) -> Arc<dyn DocumentStore> {
        self.documents.clone()
    }

    fn objects(&self, _session: &AuthSession) -> Arc<dyn ObjectStore> {
        self.objects.clone()
    }
}

#[derive(Default)]
pub struct MemoryLocal {
    values: Mutex<BTreeMap<String, String>>,
    pub fail: AtomicBool,
}

impl MemoryLocal {
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl LocalStore for MemoryLocal {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(offline());
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_changed(&self, key: &str, value: &str) -> Result<bool> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(offline());
        }
        let previous = self
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(previous.as_deref() != Some(value))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Classifier answering with a fixed verdict.
pub struct FixedClassifier {
    pub verdict: String,
    pub calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(verdict: &str) -> Self {
        Self {
            verdict: verdict.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn classify(&self, _image: &EncodedImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdict.clone())
    }

    async fn translate(&self, text: &str) -> Result<String> {
        Ok(format!("hi:{text}"))
    }
}

/// Announcer that records what it was asked to do.
#[derive(Default)]
pub struct RecordingAnnouncer {
    pub spoken: Mutex<Vec<(String, Language)>>,
    pub shared: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn speak(&self, text: &str, language: Language) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.spoken.lock().unwrap().push((text.to_string(), language));
        Ok(())
    }

    async fn share(&self, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.shared.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub backend: Arc<MemoryBackend>,
    pub local: Arc<MemoryLocal>,
    pub classifier: Arc<FixedClassifier>,
    pub announcer: Arc<RecordingAnnouncer>,
    pub ctx: ClientContext,
}

pub fn harness(verdict: &str) -> Harness {
    let backend = Arc::new(MemoryBackend::default());
    let local = Arc::new(MemoryLocal::default());
    let classifier = Arc::new(FixedClassifier::new(verdict));
    let announcer = Arc::new(RecordingAnnouncer::default());
    let ctx = ClientContext::new(backend.clone(), local.clone())
        .with_classifier(classifier.clone())
        .with_announcer(announcer.clone());
    Harness {
        backend,
        local,
        classifier,
        announcer,
        ctx,
    }
}
