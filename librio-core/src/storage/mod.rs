//! Key-value storage capability backing the persistent cache

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A key changed in storage, possibly from another session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,

    /// Raw stored text, `None` when the key was removed
    pub new_value: Option<String>,

    /// Handle that made the change
    origin: u64,
}

impl StorageEvent {
    /// An event not attributed to any local handle
    pub fn new(key: impl Into<String>, new_value: Option<String>) -> Self {
        Self {
            key: key.into(),
            new_value,
            origin: 0,
        }
    }
}

/// Change notifications from other sessions sharing the same storage.
///
/// Events caused by the subscribing handle itself are skipped.
pub struct ChangeFeed {
    rx: broadcast::Receiver<StorageEvent>,
    origin: u64,
}

impl ChangeFeed {
    /// Next pending change without waiting
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("Storage change feed lagged, skipped {} events", skipped);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Abstract key-value storage, the shape of browser local storage
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Raw text stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store raw text under `key`
    async fn set(&self, key: &str, value: String) -> StorageResult<()>;

    /// Delete `key`; deleting an absent key succeeds
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// All stored keys
    async fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Size of the stored text in bytes, 0 if absent
    async fn size(&self, key: &str) -> StorageResult<u64> {
        Ok(self.get(key).await?.map_or(0, |v| v.len() as u64))
    }

    /// Change notifications from other sessions, if this backend reports them
    fn subscribe(&self) -> Option<ChangeFeed> {
        None
    }
}

/// Local filesystem storage: one file per key under a root directory
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to its file, rejecting keys that could escape the root
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(StorageError::PermissionDenied(format!(
                "Invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

fn io_error(key: &str, e: std::io::Error) -> StorageError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
        std::io::ErrorKind::PermissionDenied => {
            StorageError::PermissionDenied(format!("{}: {}", key, e))
        }
        _ => StorageError::BackendError(format!("{}: {}", key, e)),
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let path = self.key_path(key)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(key, e))?;

        // Write to a temp file in the same directory, then rename over the target
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, value)
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let mut read_dir = match tokio::fs::read_dir(&self.root).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        };

        let mut keys = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?
        {
            if let Some(key) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
            {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_path(key)?;
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }

    async fn size(&self, key: &str) -> StorageResult<u64> {
        let path = self.key_path(key)?;
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// In-memory storage provider.
///
/// Clones are the same session. [`MemoryStorage::tab`] opens another session
/// over the same data, which then sees this one's writes through
/// [`StorageProvider::subscribe`].
#[derive(Clone)]
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
    quota: Option<usize>,
    origin: u64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            data: Arc::default(),
            events,
            quota: None,
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total stored bytes (keys plus values)
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Another session over the same data
    pub fn tab(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            events: self.events.clone(),
            quota: self.quota,
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn poisoned() -> StorageError {
        StorageError::BackendError("memory storage lock poisoned".to_string())
    }

    fn publish(&self, key: &str, new_value: Option<String>) {
        // No subscribers is fine
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            origin: self.origin,
        });
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .data
            .read()
            .map_err(|_| Self::poisoned())?
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        {
            let mut data = self.data.write().map_err(|_| Self::poisoned())?;
            if let Some(quota) = self.quota {
                let used: usize = data
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                if used + key.len() + value.len() > quota {
                    return Err(StorageError::QuotaExceeded(key.to_string()));
                }
            }
            data.insert(key.to_string(), value.clone());
        }
        self.publish(key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let removed = self
            .data
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(key)
            .is_some();
        if removed {
            self.publish(key, None);
        }
        Ok(())
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .data
            .read()
            .map_err(|_| Self::poisoned())?
            .keys()
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn subscribe(&self) -> Option<ChangeFeed> {
        Some(ChangeFeed {
            rx: self.events.subscribe(),
            origin: self.origin,
        })
    }
}

/// Storage that is never available (disabled or private-mode browser storage)
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

#[async_trait]
impl StorageProvider for UnavailableStorage {
    async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable)
    }

    async fn set(&self, _key: &str, _value: String) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }

    async fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable)
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        Err(StorageError::Unavailable)
    }
}
