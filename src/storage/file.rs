use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::{Result, StudioError},
    storage::traits::KeyValueStorage,
};

/// All slots live in one JSON object on disk; every write rewrites the file.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_slots(&self) -> Result<BTreeMap<String, String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StudioError::StorageError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            StudioError::StorageError(format!("{} is corrupt: {}", self.path.display(), e))
        })
    }

    async fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        let body = serde_json::to_string_pretty(slots)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StudioError::StorageError(format!("{}: {}", parent.display(), e)))?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StudioError::StorageError(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StudioError::StorageError(format!("{}: {}", self.path.display(), e)))
    }

    /// Current slots, or an empty map when the file cannot be parsed.
    async fn slots_for_update(&self) -> BTreeMap<String, String> {
        match self.read_slots().await {
            Ok(slots) => slots,
            Err(e) => {
                log::warn!("Discarding unreadable storage file: {}", e);
                BTreeMap::new()
            }
        }
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_slots().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut slots = self.slots_for_update().await;
        slots.insert(key.to_string(), value);
        self.write_slots(&slots).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut slots = self.slots_for_update().await;
        if slots.remove(key).is_some() {
            self.write_slots(&slots).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/store.json"));

        assert_eq!(storage.get("a").await.unwrap(), None);
        storage.set("a", "[1]".into()).await.unwrap();
        storage.set("b", "[2]".into()).await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("[1]"));

        storage.remove("a").await.unwrap();
        assert_eq!(storage.get("a").await.unwrap(), None);
        assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(storage.get("a").await.is_err());
        storage.set("a", "x".into()).await.unwrap();
        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("x"));
    }
}
