mod common;

use std::sync::atomic::Ordering;

use common::{harness, session};
use diabeto_core::workflow::{HistoryBrowser, ImageSource, run_scan};
use diabeto_core::{AuthError, Error};

#[tokio::test]
async fn scan_stores_classification_and_image() {
    let h = harness("Green - safe");
    let s = session("u1");

    let outcome = run_scan(&h.ctx, Some(&s), ImageSource::Bytes(b"jpeg".to_vec()))
        .await
        .unwrap();

    assert_eq!(outcome.response, "Green - safe");
    assert_eq!(outcome.response_hindi, None);
    assert!(outcome.image_url.starts_with("mem://images/u1/"));
    assert!(outcome.image_url.ends_with(".jpg"));

    let blobs = h.backend.objects.blobs.lock().unwrap().clone();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs.values().next().unwrap(), b"jpeg");

    let mut browser = HistoryBrowser::open(&h.ctx, Some(&s)).unwrap();
    let records = browser.refresh().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, outcome.record_id);
    assert_eq!(records[0].response, "Green - safe");
    assert_eq!(records[0].image, outcome.image_url);
}

#[tokio::test]
async fn scan_without_session_fails_before_inference() {
    let h = harness("Green - safe");

    let err = run_scan(&h.ctx, None, ImageSource::Bytes(b"jpeg".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::NotAuthenticated)));
    assert_eq!(err.user_message(), "User not authenticated");
    assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 0);
    assert!(h.backend.objects.blobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_record_write_leaves_orphaned_image() {
    let h = harness("Red - avoid");
    let s = session("u1");
    h.backend.documents.fail_writes.store(true, Ordering::SeqCst);

    let result = run_scan(&h.ctx, Some(&s), ImageSource::Bytes(b"jpeg".to_vec())).await;
    assert!(matches!(result, Err(Error::Transport(_))));

    assert_eq!(h.backend.objects.blobs.lock().unwrap().len(), 1);
    assert_eq!(h.backend.documents.count_in("users/u1/history"), 0);
}

#[tokio::test]
async fn translation_is_stored_when_enabled() {
    let h = harness("Yellow - moderate");
    let ctx = h.ctx.clone().with_translation(true);
    let s = session("u1");

    let outcome = run_scan(&ctx, Some(&s), ImageSource::Bytes(b"jpeg".to_vec()))
        .await
        .unwrap();
    assert_eq!(outcome.response_hindi.as_deref(), Some("hi:Yellow - moderate"));

    let mut browser = HistoryBrowser::open(&ctx, Some(&s)).unwrap();
    let records = browser.refresh().await.unwrap();
    assert_eq!(records[0].response_hindi.as_deref(), Some("hi:Yellow - moderate"));
}

#[tokio::test]
async fn missing_image_file_is_an_error() {
    let h = harness("Green - safe");
    let s = session("u1");

    let result = run_scan(
        &h.ctx,
        Some(&s),
        ImageSource::Path("/definitely/not/here.jpg".into()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(h.classifier.calls.load(Ordering::SeqCst), 0);
}
