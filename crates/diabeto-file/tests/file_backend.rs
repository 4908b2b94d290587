//! Workflows running against the filesystem backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use diabeto_core::workflow::{EncodedImage, HistoryBrowser, ImageSource, VisitCounter, auth, run_scan};
use diabeto_core::{
    AuthError, Backend, Classifier, ClientContext, CollectionPath, Credentials, DocumentStore, Error,
    Registration, Result, ServiceUrl, WriteFields,
};
use diabeto_file::{FileBackend, FileLocalStore};
use tempfile::TempDir;

struct Verdict;

#[async_trait]
impl Classifier for Verdict {
    async fn classify(&self, _image: &EncodedImage) -> Result<String> {
        Ok("Green - safe".to_string())
    }

    async fn translate(&self, _text: &str) -> Result<String> {
        Ok("हरा - सुरक्षित".to_string())
    }
}

fn context(dir: &TempDir) -> (Arc<FileBackend>, ClientContext) {
    let backend = Arc::new(FileBackend::new(dir.path().join("store")).with_hash_cost(4));
    let local = Arc::new(FileLocalStore::new(dir.path().join("device.json")));
    let ctx = ClientContext::new(backend.clone(), local).with_classifier(Arc::new(Verdict));
    (backend, ctx)
}

#[tokio::test]
async fn scan_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let (backend, ctx) = context(&dir);

    let session = auth::register(
        &ctx,
        &Registration::new("Asha Rao", "asha@example.com", "secret1"),
    )
    .await
    .unwrap();

    let outcome = run_scan(&ctx, Some(&session), ImageSource::Bytes(b"jpeg-bytes".to_vec()))
        .await
        .unwrap();

    let url = ServiceUrl::new(&outcome.image_url).unwrap();
    let file = url.to_file_path().unwrap();
    assert_eq!(std::fs::read(file).unwrap(), b"jpeg-bytes");
    assert!(backend.root().join("objects/images").join(session.principal.as_str()).exists());

    let mut browser = HistoryBrowser::open(&ctx, Some(&session)).unwrap();
    let records = browser.refresh().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].response, "Green - safe");

    let id = records[0].id.clone();
    browser.delete(&id).await.unwrap();
    assert!(browser.refresh().await.unwrap().is_empty());
}

#[tokio::test]
async fn other_users_history_is_denied() {
    let dir = TempDir::new().unwrap();
    let (backend, ctx) = context(&dir);

    let asha = auth::register(&ctx, &Registration::new("Asha", "asha@example.com", "secret1"))
        .await
        .unwrap();
    let ravi = auth::register(&ctx, &Registration::new("Ravi", "ravi@example.com", "secret2"))
        .await
        .unwrap();

    let asha_history = CollectionPath::user_scoped(&asha.principal, "history").unwrap();
    let err = backend
        .documents(Some(&ravi))
        .add(&asha_history, &WriteFields::new().set("response", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(ref p) if p.status == 403));

    let err = backend
        .documents(None)
        .add(&asha_history, &WriteFields::new().set("response", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
}

#[tokio::test]
async fn login_after_register() {
    let dir = TempDir::new().unwrap();
    let (_backend, ctx) = context(&dir);

    let created = auth::register(&ctx, &Registration::new("Asha", "asha@example.com", "secret1"))
        .await
        .unwrap();
    let session = auth::sign_in(&ctx, &Credentials::new(" asha@example.com ", "secret1"))
        .await
        .unwrap();
    assert_eq!(session.principal, created.principal);

    let refreshed = auth::refresh(&ctx, &session).await.unwrap();
    assert_eq!(refreshed.display_name.as_deref(), Some("Asha"));

    let err = auth::sign_in(&ctx, &Credentials::new("asha@example.com", "wrong-password"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), AuthError::WrongPassword.user_message());
}

#[tokio::test]
async fn visits_persist_across_counters() {
    let dir = TempDir::new().unwrap();
    let (_backend, ctx) = context(&dir);
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    assert!(VisitCounter::new(&ctx).track(today).await.is_new_visit_today);
    assert!(!VisitCounter::new(&ctx).track(today).await.is_new_visit_today);

    let stats = VisitCounter::new(&ctx).stats().await;
    assert_eq!(stats.total_unique_visitors, 399);
    assert_eq!(stats.total_visits, 399);
    assert_eq!(VisitCounter::new(&ctx).local_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_activations_count_once() {
    let dir = TempDir::new().unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    // Separate handles on the same files, like parallel CLI runs.
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let (_backend, ctx) = context(&dir);
        tasks.push(tokio::spawn(async move {
            VisitCounter::new(&ctx).track(today).await
        }));
    }

    let mut new_visits = 0;
    for task in tasks {
        if task.await.unwrap().is_new_visit_today {
            new_visits += 1;
        }
    }
    assert_eq!(new_visits, 1);

    let (_backend, ctx) = context(&dir);
    let counter = VisitCounter::new(&ctx);
    assert_eq!(counter.local_count().await, 1);
    let stats = counter.stats().await;
    assert_eq!(stats.total_unique_visitors, 399);
    assert_eq!(stats.total_visits, 399);
}
