use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// One monitored product and the last state we saw for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub key: String,
    pub url: String,
    pub title: String,
    /// Normalized price text; only the watcher rewrites this, and only
    /// after a change notification was delivered.
    pub last_price: String,
    /// Channel id the change alert is posted to.
    pub notify_channel: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read tracked items from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tracked items file {} is corrupt", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write tracked items to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("item {0} is already tracked")]
    Duplicate(String),
}

/// The durable map of tracked items, mirrored to a JSON file.
///
/// All mutation goes through methods that hold the lock for the whole
/// read-modify-write-persist sequence, with no await inside, so a handler
/// creating an entry and the watcher updating one can never overwrite each
/// other's write with a stale map. Callers get clones, never references
/// into the map.
#[derive(Debug)]
pub struct TrackedItemStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, TrackedItem>>,
}

impl TrackedItemStore {
    /// Load the store from disk. A missing file is an empty store (first
    /// run); any other read or parse problem surfaces as an error.
    pub fn load(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        }
        let items = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("no tracked items file at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Register a new item. Fails with `Duplicate` when the key is already
    /// tracked; the existing entry is left untouched.
    pub async fn insert(&self, item: TrackedItem) -> Result<(), StoreError> {
        let mut items = self.items.lock().await;
        if items.contains_key(&item.key) {
            return Err(StoreError::Duplicate(item.key));
        }
        items.insert(item.key.clone(), item);
        self.persist(&items)
    }

    /// Record a new observed price for `key`. Returns `false` when the
    /// entry disappeared in the meantime (removed by an admin mid-run).
    pub async fn update_price(&self, key: &str, new_price: &str) -> Result<bool, StoreError> {
        let mut items = self.items.lock().await;
        let Some(item) = items.get_mut(key) else {
            return Ok(false);
        };
        item.last_price = new_price.to_string();
        self.persist(&items)?;
        Ok(true)
    }

    /// Remove an entry. Returns whether the key existed.
    pub async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut items = self.items.lock().await;
        if items.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&items)?;
        Ok(true)
    }

    pub async fn get(&self, key: &str) -> Option<TrackedItem> {
        self.items.lock().await.get(key).cloned()
    }

    /// A stable copy of every entry, in key order.
    pub async fn snapshot(&self) -> Vec<TrackedItem> {
        self.items.lock().await.values().cloned().collect()
    }

    /// Write the whole map while the caller still holds the lock. Goes
    /// through a sibling temp file so a crash mid-write cannot leave a
    /// truncated store behind.
    fn persist(&self, items: &BTreeMap<String, TrackedItem>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(items).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn item(key: &str, price: &str) -> TrackedItem {
        TrackedItem {
            key: key.to_string(),
            url: format!("https://www.amazon.com/dp/{}", key),
            title: format!("Item {}", key),
            last_price: price.to_string(),
            notify_channel: 400,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let store = TrackedItemStore::load(dir.path().join("tracked-items.json")).unwrap();
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = TrackedItemStore::load(dir.path().join("tracked-items.json")).unwrap();
        store.insert(item("B00TEST123", "$10.00")).await.unwrap();
        let fetched = store.get("B00TEST123").await.unwrap();
        assert_eq!(fetched.last_price, "$10.00");
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_and_keeps_the_first() {
        let dir = tempdir().unwrap();
        let store = TrackedItemStore::load(dir.path().join("tracked-items.json")).unwrap();
        store.insert(item("B00TEST123", "$10.00")).await.unwrap();
        let err = store.insert(item("B00TEST123", "$99.99")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.get("B00TEST123").await.unwrap().last_price, "$10.00");
    }

    #[tokio::test]
    async fn reload_yields_an_identical_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracked-items.json");
        let store = TrackedItemStore::load(path.clone()).unwrap();
        store.insert(item("B00AAAAAAA", "$1.00")).await.unwrap();
        store.insert(item("B00BBBBBBB", "$2.00")).await.unwrap();
        let before = store.snapshot().await;

        let reloaded = TrackedItemStore::load(path).unwrap();
        assert_eq!(reloaded.snapshot().await, before);
    }

    #[tokio::test]
    async fn update_price_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracked-items.json");
        let store = TrackedItemStore::load(path.clone()).unwrap();
        store.insert(item("B00TEST123", "$10.00")).await.unwrap();
        assert!(store.update_price("B00TEST123", "$8.00").await.unwrap());

        let reloaded = TrackedItemStore::load(path).unwrap();
        assert_eq!(reloaded.get("B00TEST123").await.unwrap().last_price, "$8.00");
    }

    #[tokio::test]
    async fn update_price_for_a_missing_key_is_a_noop() {
        let dir = tempdir().unwrap();
        let store = TrackedItemStore::load(dir.path().join("tracked-items.json")).unwrap();
        assert!(!store.update_price("ghost", "$1.00").await.unwrap());
    }

    #[tokio::test]
    async fn remove_deletes_exactly_the_named_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracked-items.json");
        let store = TrackedItemStore::load(path.clone()).unwrap();
        store.insert(item("B00AAAAAAA", "$1.00")).await.unwrap();
        store.insert(item("B00BBBBBBB", "$2.00")).await.unwrap();
        assert!(store.remove("B00AAAAAAA").await.unwrap());
        assert!(!store.remove("B00AAAAAAA").await.unwrap());

        let reloaded = TrackedItemStore::load(path).unwrap();
        assert!(reloaded.get("B00AAAAAAA").await.is_none());
        assert!(reloaded.get("B00BBBBBBB").await.is_some());
    }

    #[tokio::test]
    async fn corrupt_file_surfaces_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracked-items.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = TrackedItemStore::load(path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
