//! Transport failures: no response at all still yields the normalized error.

use std::sync::Arc;

use marketfront_client::{
    ApiClient, ClientConfig, MemoryNotifier, MemoryStorage, Notify, Storage,
};
use marketfront_core::PageRequest;
use marketfront_store::AppStore;

/// A store pointed at a port nothing listens on.
fn unreachable_store() -> (AppStore, Arc<MemoryNotifier>) {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let notifier_handle: Arc<dyn Notify> = notifier.clone();
    let client = ApiClient::new(
        // Discard port; connections are refused immediately.
        &ClientConfig::new("http://127.0.0.1:9/api"),
        storage,
        notifier_handle,
    )
    .expect("build client");
    (AppStore::new(client), notifier)
}

#[tokio::test]
async fn test_network_failure_is_normalized_to_status_zero() {
    let (store, notifier) = unreachable_store();

    let err = store
        .products()
        .fetch_products(PageRequest::first())
        .await
        .expect_err("nothing listening");

    assert_eq!(err.status, 0);
    assert_eq!(err.message, "Network error. Please check your connection.");
    assert!(err.errors.is_none());
    assert_eq!(
        notifier.errors(),
        vec!["Network error. Please check your connection.".to_string()]
    );
}

#[tokio::test]
async fn test_network_failure_is_recorded_inline() {
    let (store, _notifier) = unreachable_store();

    store
        .orders()
        .fetch_my_orders()
        .await
        .expect_err("nothing listening");

    let state = store.orders().state();
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Network error. Please check your connection.")
    );
    assert!(state.orders.is_empty());
}
