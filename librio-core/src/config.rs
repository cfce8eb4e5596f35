//! Store configuration

use crate::backend::Operation;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulated round-trip latency per operation, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub publish_ms: u64,
    pub list_ms: u64,
    pub update_ms: u64,
    pub delete_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            publish_ms: 300,
            list_ms: 200,
            update_ms: 300,
            delete_ms: 200,
        }
    }
}

impl LatencyConfig {
    /// The same latency for every operation
    pub fn uniform(ms: u64) -> Self {
        Self {
            publish_ms: ms,
            list_ms: ms,
            update_ms: ms,
            delete_ms: ms,
        }
    }

    pub fn for_operation(&self, operation: Operation) -> Duration {
        let ms = match operation {
            Operation::Publish => self.publish_ms,
            Operation::List => self.list_ms,
            Operation::Update => self.update_ms,
            Operation::Delete => self.delete_ms,
        };
        Duration::from_millis(ms)
    }
}

/// Storage key names for persisted state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub cart: String,
    pub preferences: String,
    pub catalog: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart: "librio.cart".to_string(),
            preferences: "librio.preferences".to_string(),
            catalog: "librio.catalog".to_string(),
        }
    }
}

/// Configuration for a [`crate::store::CatalogStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub latency: LatencyConfig,

    /// Mirror the item list to storage as well as the cart and preferences
    pub persist_catalog: bool,

    /// Upper bound on a cart line's quantity, unlimited when `None`
    pub max_quantity_per_item: Option<u32>,

    pub keys: StorageKeys,
}

impl StoreConfig {
    /// Defaults with no simulated latency
    pub fn instant() -> Self {
        Self {
            latency: LatencyConfig::uniform(0),
            ..Self::default()
        }
    }

    pub fn with_persist_catalog(mut self, persist: bool) -> Self {
        self.persist_catalog = persist;
        self
    }

    /// Cap cart line quantities; 0 removes the cap
    pub fn with_max_quantity(mut self, max: u32) -> Self {
        self.max_quantity_per_item = (max > 0).then_some(max);
        self
    }

    /// Defaults overlaid with `LIBRIO_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|name| std::env::var(name).ok())
    }

    /// Overlay settings from a variable lookup. Unparseable values are ignored.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_var::<u64>(&lookup, "LIBRIO_LATENCY_MS") {
            self.latency = LatencyConfig::uniform(ms);
        }
        if let Some(raw) = lookup("LIBRIO_PERSIST_CATALOG") {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.persist_catalog = true,
                "0" | "false" | "no" | "off" => self.persist_catalog = false,
                _ => tracing::warn!("Ignoring invalid LIBRIO_PERSIST_CATALOG={:?}", raw),
            }
        }
        if let Some(max) = parse_var::<u32>(&lookup, "LIBRIO_MAX_QUANTITY") {
            self.max_quantity_per_item = (max > 0).then_some(max);
        }
        self
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}
