//! The capture-to-history pipeline.
//!
//! encode → classify → (translate) → upload image → resolve URL → append
//! record. The steps run strictly in sequence and are not transactional: if
//! the record write fails the uploaded image stays where it is.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::encoder::{EncodedImage, IMAGE_MIME, ImageSource, encode};
use crate::context::ClientContext;
use crate::error::{AuthError, Error};
use crate::model::HistoryRecord;
use crate::traits::AuthSession;
use crate::types::{DocumentId, ObjectPath};
use crate::Result;

/// What a completed scan produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub record_id: DocumentId,
    pub image_url: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_hindi: Option<String>,
}

/// Run the whole pipeline for one image.
///
/// # Errors
///
/// Fails with [`AuthError::NotAuthenticated`] when `session` is `None`,
/// before anything is read or sent. Otherwise the first failing step's
/// error is returned and later steps are not attempted.
#[instrument(skip_all)]
pub async fn run_scan(
    ctx: &ClientContext,
    session: Option<&AuthSession>,
    source: ImageSource,
) -> Result<ScanOutcome> {
    let session = session.ok_or(Error::Auth(AuthError::NotAuthenticated))?;
    let classifier = ctx.classifier()?;

    let image = encode(source)?;
    debug!(bytes = image.bytes().len(), "image encoded");

    let response = classifier.classify(&image).await?;
    let response_hindi = if ctx.translate() {
        Some(classifier.translate(&response).await?)
    } else {
        None
    };

    store_result(ctx, session, &image, &response, response_hindi.as_deref()).await
}

/// Upload the image and append a history record pointing at it.
///
/// # Errors
///
/// Returns the error of the failing step. An upload that succeeded is not
/// removed when a later step fails.
#[instrument(skip(ctx, session, image, response, response_hindi), fields(principal = %session.principal))]
pub async fn store_result(
    ctx: &ClientContext,
    session: &AuthSession,
    image: &EncodedImage,
    response: &str,
    response_hindi: Option<&str>,
) -> Result<ScanOutcome> {
    let backend = ctx.backend();
    let path = ObjectPath::scan_image(&session.principal, Utc::now());

    let objects = backend.objects(session);
    objects
        .upload(&path, image.bytes().to_vec(), IMAGE_MIME)
        .await?;
    let image_url = objects.download_url(&path).await?;
    debug!(%path, "image uploaded");

    let collection = ctx.history_collection().path_for(&session.principal)?;
    let fields = HistoryRecord::new_fields(&image_url, response, response_hindi);
    let record_id = backend
        .documents(Some(session))
        .add(&collection, &fields)
        .await?;
    info!(%collection, id = %record_id, "history record added");

    Ok(ScanOutcome {
        record_id,
        image_url,
        response: response.to_string(),
        response_hindi: response_hindi.map(str::to_string),
    })
}
