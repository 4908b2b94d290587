//! Startup wiring: configuration, backend selection and the client context.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::{debug, warn};

use diabeto_core::document::FieldValue;
use diabeto_core::workflow::VisitCounter;
use diabeto_core::{
    ApiKey, AuthSession, Backend, ClientContext, DocumentPath, DocumentStore, LocalStore,
};
use diabeto_file::{FileBackend, FileLocalStore};
use diabeto_http::{ChatClassifier, HostedBackend, RestClient};

use crate::announcer::CliAnnouncer;
use crate::config::{BackendConfig, Config};
use crate::session::SessionFile;

/// Where a shared inference key may be kept in the document store.
const STORED_KEY_DOCUMENT: &str = "config/inference";
const STORED_KEY_FIELD: &str = "apiKey";

/// Everything a command needs, built once per run.
pub struct App {
    config: Config,
    data_dir: PathBuf,
    sessions: SessionFile,
    backend: Arc<dyn Backend>,
    local: Arc<dyn LocalStore>,
}

impl App {
    /// Load configuration and open the configured backend.
    ///
    /// `config_path` overrides `config.json` in the platform config dir.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let dirs =
            ProjectDirs::from("", "", "diabeto").context("Could not determine config directory")?;

        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dirs.config_dir().join("config.json"));
        let config = Config::load(&config_path)?;

        let data_dir = dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let backend: Arc<dyn Backend> = match &config.backend {
            BackendConfig::File { root, hash_cost } => {
                let root = root.clone().unwrap_or_else(|| data_dir.join("store"));
                debug!(root = %root.display(), "using file backend");
                let backend = FileBackend::new(root);
                let backend = match hash_cost {
                    Some(cost) => backend.with_hash_cost(*cost),
                    None => backend,
                };
                Arc::new(backend)
            }
            BackendConfig::Firebase { .. } => {
                let hosted = config.hosted()?.context("Incomplete firebase backend config")?;
                debug!(project = %hosted.project_id, "using hosted backend");
                Arc::new(HostedBackend::new(hosted).context("Invalid firebase backend config")?)
            }
        };

        let local = Arc::new(FileLocalStore::new(data_dir.join("device.json")));

        Ok(Self {
            sessions: SessionFile::new(&data_dir),
            config,
            data_dir,
            backend,
            local,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn backend_kind(&self) -> &'static str {
        self.config.backend.kind()
    }

    pub fn sessions(&self) -> &SessionFile {
        &self.sessions
    }

    /// The signed-in session, or an error telling the user to sign in.
    pub fn require_session(&self) -> Result<AuthSession> {
        self.sessions.require(self.backend_kind())
    }

    pub fn save_session(&self, session: &AuthSession) -> Result<()> {
        self.sessions.save(self.backend_kind(), session)
    }

    /// Context without an inference client.
    pub fn context(&self) -> ClientContext {
        ClientContext::new(self.backend.clone(), self.local.clone())
            .with_announcer(Arc::new(CliAnnouncer::new(self.config.speech_command.clone())))
            .with_history_collection(self.config.history_collection)
            .with_translation(self.config.inference.translate)
    }

    /// Context with the inference client attached, if a key can be found.
    pub async fn scan_context(&self, session: &AuthSession) -> Result<ClientContext> {
        let ctx = self.context();
        let Some(key) = self.inference_key(session).await else {
            warn!("no inference API key configured");
            return Ok(ctx);
        };

        let inference = &self.config.inference;
        let client = RestClient::new(inference.endpoint_url()?)?;
        let classifier = ChatClassifier::new(client, key).with_model(inference.model.clone());
        Ok(ctx.with_classifier(Arc::new(classifier)))
    }

    async fn inference_key(&self, session: &AuthSession) -> Option<ApiKey> {
        if let Some(key) = self.config.inference.local_key() {
            return Some(key);
        }
        if !self.config.inference.key_from_store {
            return None;
        }

        let path = DocumentPath::new(STORED_KEY_DOCUMENT).ok()?;
        match self.backend.documents(Some(session)).get(&path).await {
            Ok(Some(doc)) => match doc.fields.get(STORED_KEY_FIELD) {
                Some(FieldValue::StringValue(key)) if !key.is_empty() => {
                    debug!("using inference key from the document store");
                    Some(ApiKey::new(key.clone()))
                }
                _ => None,
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "could not read stored inference key");
                None
            }
        }
    }

    /// Record this run with the visit counter. Never fails.
    pub async fn track_visit(&self) {
        let outcome = VisitCounter::new(&self.context()).track_now().await;
        debug!(
            visitor = outcome.visitor_id.as_deref().unwrap_or("-"),
            new_today = outcome.is_new_visit_today,
            "visit tracked"
        );
    }
}
