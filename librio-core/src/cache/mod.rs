//! Typed values mirrored to a storage key.
//!
//! Storage failures never reach the caller here: reads fall back to the
//! default and writes keep the in-memory value, both with a warning.

use crate::storage::{StorageEvent, StorageProvider};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Decode stored text: JSON first, then the raw text as a JSON string
pub fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw)
        .ok()
        .or_else(|| serde_json::from_value(serde_json::Value::String(raw.to_string())).ok())
}

/// Read `key`, returning `fallback` when absent, undecodable, or unreadable
pub async fn read<T>(storage: &dyn StorageProvider, key: &str, fallback: &T) -> T
where
    T: DeserializeOwned + Clone,
{
    match storage.get(key).await {
        Ok(Some(raw)) => decode(&raw).unwrap_or_else(|| {
            tracing::warn!("Could not decode stored value for key {:?}, using default", key);
            fallback.clone()
        }),
        Ok(None) => fallback.clone(),
        Err(e) => {
            tracing::warn!("Error reading storage key {:?}: {}", key, e);
            fallback.clone()
        }
    }
}

/// Encode and store `value`. A value that encodes to `null` removes the key.
///
/// Returns whether storage now reflects the value; failures are logged.
pub async fn write<T>(storage: &dyn StorageProvider, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    let encoded = match serde_json::to_value(value) {
        Ok(serde_json::Value::Null) => None,
        Ok(json) => Some(json.to_string()),
        Err(e) => {
            tracing::warn!("Could not encode value for storage key {:?}: {}", key, e);
            return false;
        }
    };

    let result = match encoded {
        Some(text) => storage.set(key, text).await,
        None => storage.remove(key).await,
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Error writing storage key {:?}: {}", key, e);
            false
        }
    }
}

/// One value kept in sync with one storage key
pub struct PersistentValue<T> {
    storage: Arc<dyn StorageProvider>,
    key: String,
    fallback: T,
    value: T,
}

impl<T> PersistentValue<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Load the current stored value, or `fallback`
    pub async fn load(storage: Arc<dyn StorageProvider>, key: impl Into<String>, fallback: T) -> Self {
        let key = key.into();
        let value = read(storage.as_ref(), &key, &fallback).await;
        Self {
            storage,
            key,
            fallback,
            value,
        }
    }

    /// The in-memory mirror
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value; the mirror changes even if storage rejects the write
    pub async fn set(&mut self, value: T) -> bool {
        self.value = value;
        write(self.storage.as_ref(), &self.key, &self.value).await
    }

    /// Replace the value with `f(previous)`
    pub async fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next).await
    }

    /// Mutate the value in place and persist it
    pub async fn modify<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = f(&mut self.value);
        write(self.storage.as_ref(), &self.key, &self.value).await;
        result
    }

    /// Delete the key and reset to the fallback
    pub async fn remove(&mut self) {
        self.value = self.fallback.clone();
        if let Err(e) = self.storage.remove(&self.key).await {
            tracing::warn!("Error removing storage key {:?}: {}", self.key, e);
        }
    }

    /// Re-read the backing store into the mirror
    pub async fn refresh(&mut self) -> &T {
        self.value = read(self.storage.as_ref(), &self.key, &self.fallback).await;
        &self.value
    }

    /// Apply a change made elsewhere. Returns whether it concerned this key.
    pub fn apply_change(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.key {
            return false;
        }
        self.value = match &event.new_value {
            Some(raw) => decode(raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Could not decode external change for key {:?}, using default",
                    self.key
                );
                self.fallback.clone()
            }),
            None => self.fallback.clone(),
        };
        true
    }

    /// Whether the key is currently stored; `false` on storage errors
    pub async fn exists(&self) -> bool {
        self.storage.exists(&self.key).await.unwrap_or(false)
    }

    /// Stored size in bytes; 0 when absent or on storage errors
    pub async fn size_of(&self) -> u64 {
        self.storage.size(&self.key).await.unwrap_or(0)
    }
}
