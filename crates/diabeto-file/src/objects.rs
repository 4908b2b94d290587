//! File-backed object store.

use async_trait::async_trait;
use tracing::instrument;

use diabeto_core::error::{Error, ProtocolError};
use diabeto_core::traits::{AuthSession, ObjectStore};
use diabeto_core::types::{ObjectPath, ServiceUrl};
use diabeto_core::Result;

use crate::identity::FileIdentity;

/// Objects stored as plain files and addressed by `file://` URLs.
///
/// Writes are allowed only below `images/{uid}` of the acting session.
#[derive(Debug, Clone)]
pub struct FileObjects {
    identity: FileIdentity,
    session: AuthSession,
}

impl FileObjects {
    pub fn new(identity: FileIdentity, session: AuthSession) -> Self {
        Self { identity, session }
    }
}

#[async_trait]
impl ObjectStore for FileObjects {
    #[instrument(skip(self, bytes), fields(%path))]
    async fn upload(&self, path: &ObjectPath, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        let account = self.identity.validate_token(&self.session.id_token)?;
        let mut segments = path.segments();
        if segments.next() != Some("images") || segments.next() != Some(account.uid.as_str()) {
            return Err(Error::Protocol(ProtocolError::new(
                403,
                Some("PERMISSION_DENIED".to_string()),
                Some(format!("cannot write {path}")),
            )));
        }

        self.identity.store().write_object(path, &bytes)?;
        Ok(())
    }

    async fn download_url(&self, path: &ObjectPath) -> Result<String> {
        let file = self.identity.store().object_file(path);
        if !file.exists() {
            return Err(Error::Protocol(ProtocolError::not_found(format!(
                "object {path} not found"
            ))));
        }
        Ok(ServiceUrl::from_file_path(&file)?.to_string())
    }
}
