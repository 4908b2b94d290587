//! Filesystem storage for the file backend.
//!
//! Layout under the root directory:
//!
//! ```text
//! auth/accounts/{uid}/account.json
//! documents/{collection...}/{id}.json
//! objects/{object path}
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use diabeto_core::Result;
use diabeto_core::document::{Document, OrderBy, StoredDocument, WriteFields};
use diabeto_core::error::{Error, InvalidInputError};
use diabeto_core::types::{CollectionPath, DocumentId, DocumentPath, ObjectPath, UserId};

pub(crate) fn map_json(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

/// Account metadata stored by the file identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAccount {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: String,
    /// bcrypt hash.
    pub password_hash: String,
}

/// On-disk form of one document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    fields: Document,
    create_time: DateTime<Utc>,
}

/// Filesystem-backed storage shared by the file services.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accounts_dir(&self) -> PathBuf {
        self.root.join("auth").join("accounts")
    }

    fn account_path(&self, uid: &UserId) -> PathBuf {
        self.accounts_dir().join(uid.as_str()).join("account.json")
    }

    fn documents_dir(&self) -> PathBuf {
        self.root.join("documents")
    }

    fn collection_dir(&self, collection: &CollectionPath) -> PathBuf {
        collection
            .segments()
            .fold(self.documents_dir(), |dir, segment| dir.join(segment))
    }

    fn document_file(&self, path: &DocumentPath) -> PathBuf {
        self.collection_dir(&path.collection())
            .join(format!("{}.json", path.id()))
    }

    /// Filesystem location of an object.
    pub fn object_file(&self, path: &ObjectPath) -> PathBuf {
        path.segments()
            .fold(self.root.join("objects"), |dir, segment| dir.join(segment))
    }

    /// Write `content` next to `path` and rename it into place.
    fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Take an exclusive lock guarding `path`; released when the file drops.
    fn lock(path: &Path) -> Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path.with_extension("lock"))?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    #[instrument(skip(self, password_hash))]
    pub fn create_account(
        &self,
        email: &str,
        display_name: Option<&str>,
        password_hash: &str,
    ) -> Result<LocalAccount> {
        let simple = Uuid::new_v4().simple().to_string();
        let uid = UserId::new(&simple[..28])?;

        let account = LocalAccount {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            created_at: Utc::now().to_rfc3339(),
            password_hash: password_hash.to_string(),
        };
        self.save_account(&account)?;

        debug!(%uid, "created local account");
        Ok(account)
    }

    pub fn save_account(&self, account: &LocalAccount) -> Result<()> {
        let uid = UserId::new(&account.uid)?;
        let content = serde_json::to_vec_pretty(account).map_err(map_json)?;
        Self::write_atomic(&self.account_path(&uid), &content)
    }

    pub fn get_account(&self, uid: &UserId) -> Result<Option<LocalAccount>> {
        let path = self.account_path(uid);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let account = serde_json::from_str(&content).map_err(map_json)?;
        Ok(Some(account))
    }

    pub fn list_accounts(&self) -> Result<Vec<LocalAccount>> {
        let dir = self.accounts_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let account_file = entry?.path().join("account.json");
            if account_file.exists() {
                let content = fs::read_to_string(&account_file)?;
                if let Ok(account) = serde_json::from_str::<LocalAccount>(&content) {
                    accounts.push(account);
                }
            }
        }
        Ok(accounts)
    }

    /// Email lookup is case-insensitive.
    pub fn find_account_by_email(&self, email: &str) -> Result<Option<LocalAccount>> {
        Ok(self
            .list_accounts()?
            .into_iter()
            .find(|a| a.email.eq_ignore_ascii_case(email)))
    }

    // ========================================================================
    // Documents
    // ========================================================================

    fn read_document(&self, path: &DocumentPath) -> Result<Option<StoredDocument>> {
        let file = self.document_file(path);
        if !file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&file)?;
        let stored: DocumentFile = serde_json::from_str(&content).map_err(map_json)?;
        Ok(Some(StoredDocument {
            path: path.clone(),
            fields: stored.fields,
            create_time: Some(stored.create_time),
        }))
    }

    fn write_document(&self, path: &DocumentPath, fields: Document, create_time: DateTime<Utc>) -> Result<()> {
        let content = serde_json::to_vec_pretty(&DocumentFile {
            fields,
            create_time,
        })
        .map_err(map_json)?;
        Self::write_atomic(&self.document_file(path), &content)
    }

    #[instrument(skip(self, fields), fields(%collection))]
    pub fn add_document(&self, collection: &CollectionPath, fields: &WriteFields) -> Result<DocumentId> {
        let simple = Uuid::new_v4().simple().to_string();
        let id = DocumentId::new(&simple[..20])?;
        let path = collection.doc(&id);
        let now = Utc::now();

        self.write_document(&path, fields.to_document(now), now)?;
        debug!(%path, "added document");
        Ok(id)
    }

    pub fn get_document(&self, path: &DocumentPath) -> Result<Option<StoredDocument>> {
        self.read_document(path)
    }

    #[instrument(skip(self), fields(%collection))]
    pub fn list_documents(
        &self,
        collection: &CollectionPath,
        order: &OrderBy,
    ) -> Result<Vec<StoredDocument>> {
        let dir = self.collection_dir(collection);
        let mut docs = Vec::new();

        if dir.exists() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| DocumentId::new(s).ok())
                else {
                    continue;
                };
                if let Some(doc) = self.read_document(&collection.doc(&id))? {
                    docs.push(doc);
                }
            }
        }

        order.apply(&mut docs);
        Ok(docs)
    }

    #[instrument(skip(self), fields(%path))]
    pub fn delete_document(&self, path: &DocumentPath) -> Result<()> {
        let file = self.document_file(path);
        if file.exists() {
            fs::remove_file(&file)?;
            debug!("deleted document");
        }
        Ok(())
    }

    /// Read-modify-write under an exclusive lock so concurrent increments
    /// are not lost.
    #[instrument(skip(self, fields), fields(%path))]
    pub fn merge_document(&self, path: &DocumentPath, fields: &WriteFields) -> Result<()> {
        let file = self.document_file(path);
        let lock_file = Self::lock(&file)?;

        let now = Utc::now();
        let (mut current, create_time) = match self.read_document(path)? {
            Some(doc) => (doc.fields, doc.create_time.unwrap_or(now)),
            None => (Document::new(), now),
        };
        current.apply(fields, now);
        self.write_document(path, current, create_time)?;

        lock_file.unlock()?;
        debug!("merged document");
        Ok(())
    }

    // ========================================================================
    // Objects
    // ========================================================================

    #[instrument(skip(self, bytes), fields(%path, len = bytes.len()))]
    pub fn write_object(&self, path: &ObjectPath, bytes: &[u8]) -> Result<PathBuf> {
        let file = self.object_file(path);
        Self::write_atomic(&file, bytes)?;
        Ok(file)
    }
}
