//! The catalog-and-cart store shared by every view.
//!
//! A [`CatalogStore`] is a cheap, cloneable handle; all clones read and
//! mutate the same state. Catalog operations go through a
//! [`CatalogBackend`] round trip first. Cart and preference operations are
//! local and mirrored to storage through [`PersistentValue`].
//!
//! Error slot rules: a round trip clears the slot on entry and writes the
//! operation's failure message if the backend fails. Validation errors are
//! returned before any of that happens and never touch the slot.

mod events;

pub use events::StoreEvent;

use crate::backend::{CatalogBackend, Operation, SimulatedBackend};
use crate::cache::PersistentValue;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::storage::{ChangeFeed, StorageProvider};
use crate::types::{
    Cart, Draft, Item, ItemId, ItemPatch, PreferenceKey, Preferences, SortOrder,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};

/// Shared handle to the catalog, cart, and preferences
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<Inner>,
}

struct Inner {
    config: StoreConfig,
    backend: Arc<dyn CatalogBackend>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
    feed: Mutex<Option<ChangeFeed>>,
}

struct StoreState {
    /// Newest first
    items: Vec<Item>,
    catalog: Option<PersistentValue<Vec<Item>>>,
    cart: PersistentValue<Cart>,
    preferences: PersistentValue<Preferences>,
    loading: bool,
    error: Option<String>,
    /// Millisecond token of the last issued id
    last_issued: u64,
}

impl StoreState {
    /// Time-derived id, bumped past the previous one when the clock has not moved
    fn next_id(&mut self, now: DateTime<Utc>) -> ItemId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let millis = millis.max(self.last_issued.saturating_add(1));
        self.last_issued = millis;
        ItemId::from_millis(millis)
    }

    fn track_ids(&mut self) {
        let newest = self.items.iter().filter_map(|i| i.id.millis()).max();
        if let Some(newest) = newest {
            self.last_issued = self.last_issued.max(newest);
        }
    }

    async fn persist_catalog(&mut self) {
        if let Some(catalog) = &mut self.catalog {
            catalog.set(self.items.clone()).await;
        }
    }
}

impl CatalogStore {
    /// Open a store over `storage` with the simulated backend
    pub async fn open(config: StoreConfig, storage: Arc<dyn StorageProvider>) -> Self {
        let backend = Arc::new(SimulatedBackend::new(config.latency));
        Self::with_backend(config, storage, backend).await
    }

    /// Open a store with an explicit backend
    pub async fn with_backend(
        config: StoreConfig,
        storage: Arc<dyn StorageProvider>,
        backend: Arc<dyn CatalogBackend>,
    ) -> Self {
        let cart = PersistentValue::load(storage.clone(), config.keys.cart.clone(), Cart::new()).await;
        let preferences = PersistentValue::load(
            storage.clone(),
            config.keys.preferences.clone(),
            Preferences::default(),
        )
        .await;

        let catalog = if config.persist_catalog {
            Some(PersistentValue::load(storage.clone(), config.keys.catalog.clone(), Vec::new()).await)
        } else {
            None
        };
        let items = catalog
            .as_ref()
            .map(|c: &PersistentValue<Vec<Item>>| c.get().clone())
            .unwrap_or_default();

        tracing::debug!(
            items = items.len(),
            cart_lines = cart.get().len(),
            persist_catalog = config.persist_catalog,
            "Opened catalog store"
        );

        let mut state = StoreState {
            items,
            catalog,
            cart,
            preferences,
            loading: false,
            error: None,
            last_issued: 0,
        };
        state.track_ids();

        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Inner {
                config,
                backend,
                state: RwLock::new(state),
                events,
                feed: Mutex::new(storage.subscribe()),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Receive a [`StoreEvent`] for every change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // Ignore errors (no subscribers)
        let _ = self.inner.events.send(event);
    }

    /// Backend step shared by catalog operations: raises the loading flag and
    /// clears the error slot. On success the flag stays up until the caller has
    /// applied its change and called [`Self::finish_loading`].
    async fn round_trip(&self, operation: Operation) -> Result<()> {
        let cleared = {
            let mut state = self.inner.state.write().await;
            state.loading = true;
            state.error.take().is_some()
        };
        if cleared {
            self.notify(StoreEvent::ErrorCleared);
        }
        self.notify(StoreEvent::LoadingChanged { loading: true });

        if let Err(e) = self.inner.backend.round_trip(operation).await {
            let message = operation.failure_message().to_string();
            {
                let mut state = self.inner.state.write().await;
                state.loading = false;
                state.error = Some(message.clone());
            }

            tracing::error!(operation = operation.as_str(), "Backend round trip failed: {}", e);
            self.notify(StoreEvent::LoadingChanged { loading: false });
            self.notify(StoreEvent::ErrorRaised { message });
            return Err(e.into());
        }
        Ok(())
    }

    /// Lower the loading flag once the round trip's result is in `state`
    fn finish_loading(state: &mut StoreState) {
        state.loading = false;
    }

    // ----- catalog -----

    /// Validate and publish a draft; the new item goes first in the listing
    pub async fn publish_item(&self, draft: Draft) -> Result<Item> {
        draft.validate()?;
        self.round_trip(Operation::Publish).await?;

        let item = {
            let mut state = self.inner.state.write().await;
            let now = Utc::now();
            let id = state.next_id(now);
            let item = draft.into_item(id, now);
            state.items.insert(0, item.clone());
            state.persist_catalog().await;
            Self::finish_loading(&mut state);
            item
        };

        tracing::info!(id = %item.id, title = %item.title, "Published item");
        self.notify(StoreEvent::ItemPublished {
            id: item.id.clone(),
            title: item.title.clone(),
        });
        self.notify(StoreEvent::LoadingChanged { loading: false });
        Ok(item)
    }

    /// Refresh and return the item list
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        self.round_trip(Operation::List).await?;
        let items = {
            let mut state = self.inner.state.write().await;
            Self::finish_loading(&mut state);
            state.items.clone()
        };
        self.notify(StoreEvent::LoadingChanged { loading: false });
        Ok(items)
    }

    /// Merge `patch` into the item with `id`. An unknown id is not an error.
    pub async fn update_item(&self, id: &ItemId, patch: ItemPatch) -> Result<Option<Item>> {
        patch.validate()?;
        self.round_trip(Operation::Update).await?;

        let updated = {
            let mut state = self.inner.state.write().await;
            let now = Utc::now();
            let updated = state.items.iter_mut().find(|i| &i.id == id).map(|item| {
                item.apply(patch, now);
                item.clone()
            });
            if updated.is_some() {
                state.persist_catalog().await;
            }
            Self::finish_loading(&mut state);
            updated
        };

        match &updated {
            Some(_) => {
                tracing::debug!(%id, "Updated item");
                self.notify(StoreEvent::ItemUpdated { id: id.clone() });
            }
            None => tracing::debug!(%id, "Update skipped, no such item"),
        }
        self.notify(StoreEvent::LoadingChanged { loading: false });
        Ok(updated)
    }

    /// Remove the item with `id`. Returns whether it existed.
    pub async fn delete_item(&self, id: &ItemId) -> Result<bool> {
        self.round_trip(Operation::Delete).await?;

        let removed = {
            let mut state = self.inner.state.write().await;
            let before = state.items.len();
            state.items.retain(|i| &i.id != id);
            let removed = state.items.len() != before;
            if removed {
                state.persist_catalog().await;
            }
            Self::finish_loading(&mut state);
            removed
        };

        if removed {
            tracing::info!(%id, "Deleted item");
            self.notify(StoreEvent::ItemDeleted { id: id.clone() });
        }
        self.notify(StoreEvent::LoadingChanged { loading: false });
        Ok(removed)
    }

    pub async fn find_item_by_id(&self, id: &ItemId) -> Option<Item> {
        let state = self.inner.state.read().await;
        state.items.iter().find(|i| &i.id == id).cloned()
    }

    /// Snapshot of the item list, newest first
    pub async fn items(&self) -> Vec<Item> {
        self.inner.state.read().await.items.clone()
    }

    pub async fn sorted_items(&self, order: SortOrder) -> Vec<Item> {
        let mut items = self.items().await;
        order.sort(&mut items);
        items
    }

    /// Items in the user's preferred gallery order
    pub async fn gallery_items(&self) -> Vec<Item> {
        let order = self.preferences().await.gallery_sort;
        self.sorted_items(order).await
    }

    /// Items whose title or author contains `query`, case-insensitively
    pub async fn search_items(&self, query: &str) -> Vec<Item> {
        let state = self.inner.state.read().await;
        state
            .items
            .iter()
            .filter(|i| i.matches(query))
            .cloned()
            .collect()
    }

    // ----- cart -----

    /// Add `quantity` units, accumulating into an existing line.
    /// Returns the line's quantity afterwards.
    pub async fn add_to_cart(&self, item: &Item, quantity: u32) -> u32 {
        let max = self.inner.config.max_quantity_per_item;
        let line_quantity = {
            let mut state = self.inner.state.write().await;
            state
                .cart
                .modify(|cart| cart.add(item.clone(), quantity, max))
                .await
        };

        tracing::debug!(id = %item.id, quantity, line_quantity, "Added to cart");
        self.notify(StoreEvent::CartChanged);
        line_quantity
    }

    /// Replace a line's quantity; 0 removes the line. Returns whether the cart changed.
    pub async fn set_cart_quantity(&self, id: &ItemId, quantity: u32) -> bool {
        let max = self.inner.config.max_quantity_per_item;
        let changed = {
            let mut state = self.inner.state.write().await;
            state
                .cart
                .modify(|cart| cart.set_quantity(id, quantity, max))
                .await
        };

        if changed {
            self.notify(StoreEvent::CartChanged);
        }
        changed
    }

    /// Remove a line. Returns whether it existed.
    pub async fn remove_from_cart(&self, id: &ItemId) -> bool {
        let removed = {
            let mut state = self.inner.state.write().await;
            state.cart.modify(|cart| cart.remove(id)).await
        };

        if removed {
            self.notify(StoreEvent::CartChanged);
        }
        removed
    }

    /// Empty the cart and delete its persisted copy
    pub async fn clear_cart(&self) {
        self.inner.state.write().await.cart.remove().await;
        self.notify(StoreEvent::CartChanged);
    }

    pub async fn cart(&self) -> Cart {
        self.inner.state.read().await.cart.get().clone()
    }

    pub async fn cart_total(&self) -> Decimal {
        self.inner.state.read().await.cart.get().total()
    }

    pub async fn cart_item_count(&self) -> u64 {
        self.inner.state.read().await.cart.get().item_count()
    }

    // ----- preferences -----

    pub async fn preferences(&self) -> Preferences {
        self.inner.state.read().await.preferences.get().clone()
    }

    /// Set one preference from its string form
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<Preferences> {
        let key: PreferenceKey = key.parse()?;
        let mut state = self.inner.state.write().await;
        let mut preferences = state.preferences.get().clone();
        preferences.set(key, value)?;
        state.preferences.set(preferences.clone()).await;
        drop(state);

        tracing::debug!(key = key.as_str(), value, "Preference set");
        self.notify(StoreEvent::PreferencesChanged);
        Ok(preferences)
    }

    pub async fn update_preferences<F>(&self, f: F) -> Preferences
    where
        F: FnOnce(&mut Preferences),
    {
        let preferences = {
            let mut state = self.inner.state.write().await;
            state
                .preferences
                .modify(|prefs| {
                    f(prefs);
                    prefs.clone()
                })
                .await
        };
        self.notify(StoreEvent::PreferencesChanged);
        preferences
    }

    /// Back to defaults, deleting the persisted copy
    pub async fn reset_preferences(&self) -> Preferences {
        let preferences = {
            let mut state = self.inner.state.write().await;
            state.preferences.remove().await;
            state.preferences.get().clone()
        };
        self.notify(StoreEvent::PreferencesChanged);
        preferences
    }

    // ----- transient flags -----

    pub async fn is_loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    /// Message of the last backend failure, if not yet cleared
    pub async fn error(&self) -> Option<String> {
        self.inner.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        let cleared = self.inner.state.write().await.error.take().is_some();
        if cleared {
            self.notify(StoreEvent::ErrorCleared);
        }
    }

    // ----- cross-session sync -----

    /// Apply storage changes made by other sessions. Returns how many applied.
    pub async fn sync_external(&self) -> usize {
        let mut feed = self.inner.feed.lock().await;
        let Some(feed) = feed.as_mut() else {
            return 0;
        };

        let mut applied = Vec::new();
        {
            let mut guard = self.inner.state.write().await;
            let state = &mut *guard;
            while let Some(event) = feed.try_next() {
                if state.cart.apply_change(&event) {
                    applied.push(StoreEvent::CartChanged);
                } else if state.preferences.apply_change(&event) {
                    applied.push(StoreEvent::PreferencesChanged);
                } else if let Some(catalog) = &mut state.catalog {
                    if catalog.apply_change(&event) {
                        state.items = catalog.get().clone();
                        applied.push(StoreEvent::CatalogReloaded);
                    }
                }
            }
            state.track_ids();
        }

        if !applied.is_empty() {
            tracing::debug!(changes = applied.len(), "Applied external storage changes");
        }
        let count = applied.len();
        for event in applied {
            self.notify(event);
        }
        count
    }
}
