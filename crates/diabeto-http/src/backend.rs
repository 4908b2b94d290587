//! Hosted backend wiring.

use std::sync::Arc;

use diabeto_core::traits::{AuthSession, Backend, DocumentStore, IdentityProvider, ObjectStore};
use diabeto_core::types::ServiceUrl;
use diabeto_core::{ApiKey, Result};

use crate::client::{RestClient, require_non_empty};
use crate::documents::RestDocuments;
use crate::identity::RestIdentity;
use crate::storage::RestStorage;

/// Base URLs of the hosted services.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub identity: ServiceUrl,
    pub token: ServiceUrl,
    pub firestore: ServiceUrl,
    pub storage: ServiceUrl,
}

impl Endpoints {
    /// Production endpoints.
    ///
    /// # Errors
    ///
    /// Never in practice; the constants are valid URLs.
    pub fn hosted() -> Result<Self> {
        Ok(Self {
            identity: ServiceUrl::new("https://identitytoolkit.googleapis.com")?,
            token: ServiceUrl::new("https://securetoken.googleapis.com")?,
            firestore: ServiceUrl::new("https://firestore.googleapis.com")?,
            storage: ServiceUrl::new("https://firebasestorage.googleapis.com")?,
        })
    }

    /// Every service at one base URL, as with a local emulator or test
    /// server.
    pub fn single(base: ServiceUrl) -> Self {
        Self {
            identity: base.clone(),
            token: base.clone(),
            firestore: base.clone(),
            storage: base,
        }
    }
}

/// Project settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct HostedConfig {
    pub api_key: ApiKey,
    pub project_id: String,
    pub storage_bucket: String,
    pub endpoints: Endpoints,
}

/// Identity, documents and storage on the hosted services.
#[derive(Debug, Clone)]
pub struct HostedBackend {
    identity: RestIdentity,
    firestore: RestClient,
    storage: RestClient,
    api_key: ApiKey,
    project_id: String,
    bucket: String,
}

impl HostedBackend {
    /// # Errors
    ///
    /// Returns an error for a blank project id, bucket or API key.
    pub fn new(config: HostedConfig) -> Result<Self> {
        require_non_empty("apiKey", config.api_key.as_str())?;
        require_non_empty("projectId", &config.project_id)?;
        require_non_empty("storageBucket", &config.storage_bucket)?;

        let identity = RestIdentity::new(
            RestClient::new(config.endpoints.identity)?,
            RestClient::new(config.endpoints.token)?,
            config.api_key.clone(),
        );
        Ok(Self {
            identity,
            firestore: RestClient::new(config.endpoints.firestore)?,
            storage: RestClient::new(config.endpoints.storage)?,
            api_key: config.api_key,
            project_id: config.project_id,
            bucket: config.storage_bucket,
        })
    }
}

impl Backend for HostedBackend {
    fn identity(&self) -> Arc<dyn IdentityProvider> {
        Arc::new(self.identity.clone())
    }

    fn documents(&self, session: Option<&AuthSession>) -> Arc<dyn DocumentStore> {
        Arc::new(RestDocuments::new(
            self.firestore.clone(),
            self.project_id.clone(),
            self.api_key.clone(),
            session.cloned(),
        ))
    }

    fn objects(&self, session: &AuthSession) -> Arc<dyn ObjectStore> {
        Arc::new(RestStorage::new(
            self.storage.clone(),
            self.bucket.clone(),
            session.clone(),
        ))
    }
}
