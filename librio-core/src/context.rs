//! Application context handed to views

use crate::config::StoreConfig;
use crate::error::Result;
use crate::storage::StorageProvider;
use crate::store::CatalogStore;
use crate::types::{Draft, Item};
use std::sync::Arc;
use uuid::Uuid;

/// Sign-in state for the running session. Never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    user: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            user: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Signed-in user's display name
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_in(&mut self, user: impl Into<String>) {
        let user = user.into();
        tracing::info!(session = %self.id, %user, "Signed in");
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(session = %self.id, %user, "Signed out");
        }
    }
}

/// Everything a view needs, built once at application start
pub struct AppContext {
    pub store: CatalogStore,
    pub session: Session,
}

impl AppContext {
    pub async fn start(config: StoreConfig, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            store: CatalogStore::open(config, storage).await,
            session: Session::new(),
        }
    }

    /// Publish on behalf of the signed-in user, if any
    pub async fn publish(&self, mut draft: Draft) -> Result<Item> {
        if draft.seller.is_none() {
            draft.seller = self.session.user().map(str::to_string);
        }
        self.store.publish_item(draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::DEFAULT_SELLER;
    use rust_decimal::Decimal;

    #[test]
    fn test_session_sign_in_out() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());
        session.sign_in("ana");
        assert_eq!(session.user(), Some("ana"));
        session.sign_out();
        assert!(!session.is_authenticated());
        assert_ne!(session.id(), Session::new().id());
    }

    #[tokio::test]
    async fn test_publish_uses_session_user() {
        let mut ctx = AppContext::start(StoreConfig::instant(), Arc::new(MemoryStorage::new())).await;

        let anonymous = ctx
            .publish(Draft::new("A", "B", Decimal::ONE))
            .await
            .unwrap();
        assert_eq!(anonymous.seller, DEFAULT_SELLER);

        ctx.session.sign_in("ana");
        let signed = ctx
            .publish(Draft::new("C", "D", Decimal::ONE))
            .await
            .unwrap();
        assert_eq!(signed.seller, "ana");

        let explicit = ctx
            .publish(Draft::new("E", "F", Decimal::ONE).with_seller("luis"))
            .await
            .unwrap();
        assert_eq!(explicit.seller, "luis");
    }
}
