//! Device key-value storage in a single JSON file.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;

use diabeto_core::traits::LocalStore;
use diabeto_core::Result;

use crate::store::map_json;

/// String key-value pairs persisted to one JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    path: PathBuf,
}

impl FileLocalStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(map_json)
    }

    fn update<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.path.with_extension("lock"))?;
        lock_file.lock_exclusive()?;

        let mut values = self.read()?;
        let out = f(&mut values);
        let content = serde_json::to_vec_pretty(&values).map_err(map_json)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.path)?;

        lock_file.unlock()?;
        Ok(out)
    }
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    async fn set_if_changed(&self, key: &str, value: &str) -> Result<bool> {
        self.update(|values| {
            let previous = values.insert(key.to_string(), value.to_string());
            previous.as_deref() != Some(value)
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileLocalStore::new(dir.path().join("device.json"));

        assert_eq!(store.get("visit_count").await.unwrap(), None);
        store.set("visit_count", "1").await.unwrap();
        store.set("visitor_id", "visitor_1_abc").await.unwrap();
        assert_eq!(store.get("visit_count").await.unwrap().as_deref(), Some("1"));

        store.remove("visit_count").await.unwrap();
        store.remove("never_set").await.unwrap();
        assert_eq!(store.get("visit_count").await.unwrap(), None);
        assert_eq!(
            store.get("visitor_id").await.unwrap().as_deref(),
            Some("visitor_1_abc")
        );
    }

    #[tokio::test]
    async fn set_if_changed_reports_writes() {
        let dir = TempDir::new().unwrap();
        let store = FileLocalStore::new(dir.path().join("device.json"));

        assert!(store.set_if_changed("last_visit_date", "2025-03-01").await.unwrap());
        assert!(!store.set_if_changed("last_visit_date", "2025-03-01").await.unwrap());
        assert!(store.set_if_changed("last_visit_date", "2025-03-02").await.unwrap());
        assert_eq!(
            store.get("last_visit_date").await.unwrap().as_deref(),
            Some("2025-03-02")
        );
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.json");
        FileLocalStore::new(&path).set("k", "v").await.unwrap();
        assert_eq!(
            FileLocalStore::new(&path).get("k").await.unwrap().as_deref(),
            Some("v")
        );
    }
}
