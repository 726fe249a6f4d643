//! Marketfront store - application state slices.
//!
//! Three independent slices (auth, products, orders) own the client-side
//! entity state. Every asynchronous operation follows the same lifecycle:
//!
//! - **pending**: `loading = true`, prior `error` cleared
//! - **fulfilled**: `loading = false`, `error` cleared, the operation's
//!   data mutation applied, optional success notification
//! - **rejected**: `loading = false`, `error` set to the normalized
//!   message, data left untouched (except where a slice documents
//!   otherwise)
//!
//! Transport and HTTP failures are already surfaced as notifications by
//! the HTTP layer; slices only record the message for inline display.
//! Concurrent dispatches of the same operation are not de-duplicated and
//! there is no cancellation; a stale response can overwrite fresher state.
//!
//! The composed [`AppStore`] is explicitly constructed and injected into
//! the UI layer at startup - there are no module-level singletons.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use std::sync::Arc;

use serde::Serialize;

use marketfront_client::ApiClient;

pub use auth::{AuthSlice, AuthState};
pub use cart::{Cart, CartError, CartItem};
pub use orders::{OrderSlice, OrdersState};
pub use products::{ProductSlice, ProductsState};

/// The composed application store.
///
/// Cheaply cloneable via `Arc`; every clone shares the same slices.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<AppStoreInner>,
}

struct AppStoreInner {
    auth: AuthSlice,
    products: ProductSlice,
    orders: OrderSlice,
}

impl AppStore {
    /// Compose the three slices over a shared API client.
    ///
    /// The auth slice hydrates itself from the client's persistent
    /// storage, so a surviving session is authenticated immediately.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(AppStoreInner {
                auth: AuthSlice::new(client.clone()),
                products: ProductSlice::new(client.clone()),
                orders: OrderSlice::new(client),
            }),
        }
    }

    /// The authentication slice.
    #[must_use]
    pub fn auth(&self) -> &AuthSlice {
        &self.inner.auth
    }

    /// The product catalog slice.
    #[must_use]
    pub fn products(&self) -> &ProductSlice {
        &self.inner.products
    }

    /// The order book slice.
    #[must_use]
    pub fn orders(&self) -> &OrderSlice {
        &self.inner.orders
    }

    /// A serializable snapshot of the whole store.
    ///
    /// Also serves as the serializability check: every slice state type
    /// derives `Serialize`, so nothing non-serializable can leak into the
    /// store.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            auth: self.inner.auth.state(),
            products: self.inner.products.state(),
            orders: self.inner.orders.state(),
        }
    }
}

/// Point-in-time copy of all slice states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub auth: AuthState,
    pub products: ProductsState,
    pub orders: OrdersState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketfront_client::storage::{self, keys};
    use marketfront_client::{ClientConfig, MemoryNotifier, MemoryStorage, Notify, Storage};
    use marketfront_core::{User, UserId, UserRole};

    fn store_with(storage: Arc<MemoryStorage>) -> AppStore {
        let storage: Arc<dyn Storage> = storage;
        let notifier: Arc<dyn Notify> = Arc::new(MemoryNotifier::new());
        let client = ApiClient::new(&ClientConfig::new("http://localhost:9/api"), storage, notifier)
            .expect("client");
        AppStore::new(client)
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            email: "a@b.com".to_string(),
            username: "ab".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Baker".to_string(),
            role: UserRole::User,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_snapshot_is_serializable() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let json = serde_json::to_value(store.snapshot()).expect("serialize snapshot");
        assert_eq!(json["auth"]["is_authenticated"], false);
        assert_eq!(json["products"]["current_page"], 0);
        assert!(json["orders"]["orders"].as_array().is_some_and(Vec::is_empty));
    }

    #[test]
    fn test_auth_hydrates_from_persisted_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage::set_json(storage.as_ref(), keys::TOKEN, &"t1".to_string());
        storage::set_json(storage.as_ref(), keys::USER, &sample_user());

        let store = store_with(storage);
        let state = store.auth().state();
        assert!(state.is_authenticated);
        assert_eq!(state.token.as_deref(), Some("t1"));
        assert_eq!(
            state.user.as_ref().map(|user| user.email.as_str()),
            Some("a@b.com")
        );
    }

    #[test]
    fn test_clones_share_slices() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let clone = store.clone();
        clone.auth().update_user(sample_user());
        assert_eq!(
            store.auth().state().user.map(|user| user.email),
            Some("a@b.com".to_string())
        );
    }
}
