//! Object storage REST client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use diabeto_core::error::{Error, ProtocolError};
use diabeto_core::traits::{AuthSession, ObjectStore};
use diabeto_core::types::ObjectPath;
use diabeto_core::Result;

use crate::client::RestClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Percent-encode an object path as a single URL segment.
fn encode_path(path: &ObjectPath) -> String {
    url::form_urlencoded::byte_serialize(path.as_str().as_bytes()).collect()
}

/// Bucket storage acting as one session.
#[derive(Debug, Clone)]
pub struct RestStorage {
    client: RestClient,
    bucket: String,
    session: AuthSession,
}

impl RestStorage {
    pub fn new(client: RestClient, bucket: impl Into<String>, session: AuthSession) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            session,
        }
    }

    fn object_path(&self, path: &ObjectPath) -> String {
        format!("v0/b/{}/o/{}", self.bucket, encode_path(path))
    }
}

#[async_trait]
impl ObjectStore for RestStorage {
    #[instrument(skip(self, bytes), fields(%path, bucket = %self.bucket))]
    async fn upload(&self, path: &ObjectPath, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .post_bytes(
                &format!("v0/b/{}/o", self.bucket),
                &[("name", path.as_str())],
                bytes,
                content_type,
                Some(self.session.id_token.as_str()),
            )
            .await?;
        debug!("object uploaded");
        Ok(())
    }

    /// Uses the first download token from the object's metadata.
    #[instrument(skip(self), fields(%path, bucket = %self.bucket))]
    async fn download_url(&self, path: &ObjectPath) -> Result<String> {
        let object = self.object_path(path);
        let metadata: ObjectMetadata = self
            .client
            .get_json(&object, &[], Some(self.session.id_token.as_str()))
            .await?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or_else(|| {
                Error::Protocol(ProtocolError::new(
                    200,
                    Some("NoDownloadToken".to_string()),
                    Some(format!("object {path} has no download token")),
                ))
            })?;

        let encoded_token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
        Ok(format!(
            "{}?alt=media&token={encoded_token}",
            self.client.url(&object)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_path_is_one_segment() {
        let path = ObjectPath::new("images/u1/1700000000000.jpg").unwrap();
        assert_eq!(encode_path(&path), "images%2Fu1%2F1700000000000.jpg");
    }
}
