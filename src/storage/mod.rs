pub mod file;
pub mod memory;
pub mod traits;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::KeyValueStorage;

pub const SAVED_INSPIRATION_KEY: &str = "savedInspiration";

/// Saved inspiration library: an ordered, duplicate-free list of data URLs,
/// newest first, rewritten to its slot after every change.
pub struct InspirationStore {
    backend: Arc<dyn KeyValueStorage>,
    items: Vec<String>,
}

impl InspirationStore {
    /// Reads the slot. Missing, unreadable or unparsable content yields an
    /// empty library instead of an error.
    pub async fn load(backend: Arc<dyn KeyValueStorage>) -> Self {
        let items = match backend.get(SAVED_INSPIRATION_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("Saved inspiration is not a list of strings, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read saved inspiration, starting empty: {}", e);
                Vec::new()
            }
        };

        log::debug!("Loaded {} saved inspiration item(s)", items.len());
        Self { backend, items }
    }

    pub async fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::load(Arc::new(FileStorage::new(path))).await
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, data_url: &str) -> bool {
        self.items.iter().any(|item| item == data_url)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Prepends `data_url`. Returns `false` without touching storage when it
    /// is already saved. The in-memory list only changes once the write
    /// succeeds.
    pub async fn save(&mut self, data_url: impl Into<String>) -> Result<bool> {
        let data_url = data_url.into();
        if self.contains(&data_url) {
            return Ok(false);
        }

        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.push(data_url);
        next.extend(self.items.iter().cloned());
        self.commit(next).await?;
        Ok(true)
    }

    pub async fn remove(&mut self, data_url: &str) -> Result<bool> {
        if !self.contains(data_url) {
            return Ok(false);
        }

        let next = self
            .items
            .iter()
            .filter(|item| item.as_str() != data_url)
            .cloned()
            .collect();
        self.commit(next).await?;
        Ok(true)
    }

    /// Drops the slot entirely; the next load sees an empty library.
    pub async fn clear(&mut self) -> Result<()> {
        self.backend.remove(SAVED_INSPIRATION_KEY).await?;
        self.items.clear();
        Ok(())
    }

    async fn commit(&mut self, next: Vec<String>) -> Result<()> {
        let raw = serde_json::to_string(&next)?;
        self.backend.set(SAVED_INSPIRATION_KEY, raw).await?;
        self.items = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "data:image/png;base64,QQ==";
    const B: &str = "data:image/png;base64,Qg==";

    #[tokio::test]
    async fn test_round_trip_keeps_order() {
        let backend: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let mut store = InspirationStore::load(backend.clone()).await;
        assert!(store.is_empty());

        assert!(store.save(A).await.unwrap());
        assert!(store.save(B).await.unwrap());
        assert_eq!(store.items(), &[B, A]);

        let reloaded = InspirationStore::load(backend).await;
        assert_eq!(reloaded.items(), store.items());
    }

    #[tokio::test]
    async fn test_duplicate_save_is_noop() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = InspirationStore::load(backend.clone()).await;
        store.save(A).await.unwrap();
        store.save(B).await.unwrap();

        assert!(!store.save(A).await.unwrap());
        assert_eq!(store.items(), &[B, A]);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = InspirationStore::load(backend.clone()).await;
        store.save(A).await.unwrap();
        store.save(B).await.unwrap();

        assert!(store.remove(A).await.unwrap());
        assert!(!store.remove(A).await.unwrap());
        assert_eq!(InspirationStore::load(backend.clone()).await.items(), &[B]);

        store.clear().await.unwrap();
        assert!(InspirationStore::load(backend).await.is_empty());
    }

    /// Reads succeed, every write fails.
    struct ReadOnlyStorage(MemoryStorage);

    #[async_trait::async_trait]
    impl KeyValueStorage for ReadOnlyStorage {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: String) -> Result<()> {
            Err(crate::error::StudioError::StorageError("disk full".into()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(crate::error::StudioError::StorageError("disk full".into()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_items_untouched() {
        let seeded = serde_json::to_string(&[A]).unwrap();
        let backend = Arc::new(ReadOnlyStorage(MemoryStorage::with_slot(
            SAVED_INSPIRATION_KEY,
            seeded,
        )));
        let mut store = InspirationStore::load(backend).await;
        assert_eq!(store.items(), &[A]);

        assert!(store.save(B).await.is_err());
        assert_eq!(store.items(), &[A]);

        assert!(store.remove(A).await.is_err());
        assert_eq!(store.items(), &[A]);

        assert!(store.clear().await.is_err());
        assert_eq!(store.items(), &[A]);
    }

    #[tokio::test]
    async fn test_clear_removes_the_slot() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = InspirationStore::load(backend.clone()).await;
        store.save(A).await.unwrap();

        store.clear().await.unwrap();
        assert!(store.is_empty());
        assert_eq!(backend.get(SAVED_INSPIRATION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_slot_loads_empty() {
        let backend = Arc::new(MemoryStorage::with_slot(SAVED_INSPIRATION_KEY, "{oops"));
        assert!(InspirationStore::load(backend).await.is_empty());

        let backend = Arc::new(MemoryStorage::with_slot(SAVED_INSPIRATION_KEY, "[1, 2]"));
        assert!(InspirationStore::load(backend).await.is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_inspiration.json");

        let mut store = InspirationStore::open_file(&path).await;
        store.save(A).await.unwrap();
        store.save(B).await.unwrap();

        let reopened = InspirationStore::open_file(&path).await;
        assert_eq!(reopened.items(), &[B, A]);
        assert_eq!(reopened.get(1), Some(A));
    }
}
