//! `config.json` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use diabeto_core::{ApiKey, HistoryCollection, ServiceUrl};
use diabeto_http::{DEFAULT_MODEL, Endpoints, HostedConfig};

const DEFAULT_INFERENCE_ENDPOINT: &str = "https://api.openai.com";

/// Environment variable that overrides the configured inference key.
pub const INFERENCE_KEY_ENV: &str = "DIABETO_INFERENCE_KEY";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub backend: BackendConfig,
    pub inference: InferenceConfig,
    pub history_collection: HistoryCollection,
    pub track_visits: bool,
    /// Program used to read results aloud.
    pub speech_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            inference: InferenceConfig::default(),
            history_collection: HistoryCollection::default(),
            track_visits: true,
            speech_command: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Everything under a local directory.
    #[serde(rename_all = "camelCase")]
    File {
        #[serde(default)]
        root: Option<PathBuf>,
        /// bcrypt cost for new account hashes.
        #[serde(default)]
        hash_cost: Option<u32>,
    },
    /// The hosted identity, document and storage services.
    #[serde(rename_all = "camelCase")]
    Firebase {
        api_key: String,
        project_id: String,
        storage_bucket: String,
        #[serde(default)]
        endpoints: EndpointOverrides,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::File {
            root: None,
            hash_cost: None,
        }
    }
}

impl BackendConfig {
    /// Name stored alongside a session so it is not reused against another
    /// backend.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::File { .. } => "file",
            BackendConfig::Firebase { .. } => "firebase",
        }
    }
}

/// Base URL overrides, for emulators.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EndpointOverrides {
    pub identity: Option<String>,
    pub token: Option<String>,
    pub firestore: Option<String>,
    pub storage: Option<String>,
}

impl EndpointOverrides {
    fn resolve(&self) -> Result<Endpoints> {
        let hosted = Endpoints::hosted()?;
        let pick = |value: &Option<String>, default: ServiceUrl| -> Result<ServiceUrl> {
            match value {
                Some(url) => ServiceUrl::new(url).with_context(|| format!("Invalid endpoint {url}")),
                None => Ok(default),
            }
        };
        Ok(Endpoints {
            identity: pick(&self.identity, hosted.identity)?,
            token: pick(&self.token, hosted.token)?,
            firestore: pick(&self.firestore, hosted.firestore)?,
            storage: pick(&self.storage, hosted.storage)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Read `config/inference.apiKey` from the document store when no key
    /// is configured locally.
    pub key_from_store: bool,
    /// Also request a Hindi translation of each verdict.
    pub translate: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            key_from_store: false,
            translate: false,
        }
    }
}

impl InferenceConfig {
    pub fn endpoint_url(&self) -> Result<ServiceUrl> {
        ServiceUrl::new(&self.endpoint)
            .with_context(|| format!("Invalid inference endpoint {}", self.endpoint))
    }

    /// The locally available key: environment first, then the file.
    pub fn local_key(&self) -> Option<ApiKey> {
        std::env::var(INFERENCE_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .map(ApiKey::new)
    }
}

impl Config {
    /// Read the file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Settings for the hosted backend, if that is the configured one.
    pub fn hosted(&self) -> Result<Option<HostedConfig>> {
        let BackendConfig::Firebase {
            api_key,
            project_id,
            storage_bucket,
            endpoints,
        } = &self.backend
        else {
            return Ok(None);
        };
        Ok(Some(HostedConfig {
            api_key: ApiKey::new(api_key.clone()),
            project_id: project_id.clone(),
            storage_bucket: storage_bucket.clone(),
            endpoints: endpoints.resolve()?,
        }))
    }
}
