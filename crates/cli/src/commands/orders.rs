//! `market-cli orders` handlers.

use marketfront_client::ApiClient;
use marketfront_core::{ApiError, OrderId, OrderStatus, PageRequest, ProductId};
use marketfront_store::{AppStore, Cart};

use super::print_json;

pub async fn mine(store: &AppStore) -> Result<(), ApiError> {
    store.orders().fetch_my_orders().await?;
    print_json(&store.orders().state().orders);
    Ok(())
}

pub async fn list(store: &AppStore, page: u32, size: u32) -> Result<(), ApiError> {
    store.orders().fetch_all(PageRequest { page, size }).await?;
    print_json(&store.orders().state().orders);
    Ok(())
}

pub async fn get(store: &AppStore, id: OrderId) -> Result<(), ApiError> {
    store.orders().fetch_order(id).await?;
    print_json(&store.orders().state().current_order);
    Ok(())
}

/// Build a cart from `id:quantity` pairs and check it out.
///
/// Each product is fetched so the cart can enforce its stock bound before
/// any order reaches the backend.
pub async fn create(
    store: &AppStore,
    client: &ApiClient,
    items: &[(ProductId, u32)],
    address: String,
) -> Result<(), ApiError> {
    let mut cart = Cart::new();
    for &(product_id, quantity) in items {
        let product = client.product(product_id).await?;
        cart.add(&product)
            .and_then(|_| cart.set_quantity(product_id, quantity))
            .map_err(|e| ApiError::new(e.to_string(), 0))?;
    }

    store.orders().create(cart.to_order_request(address)).await?;
    print_json(&store.orders().state().current_order);
    Ok(())
}

pub async fn status(store: &AppStore, id: OrderId, status: OrderStatus) -> Result<(), ApiError> {
    // Focus the order first so the updated copy lands in `current_order`
    // for printing.
    store.orders().fetch_order(id).await?;
    store.orders().update_status(id, status).await?;
    print_json(&store.orders().state().current_order);
    Ok(())
}

/// Parse a cart line given as `<product-id>:<quantity>`.
pub fn parse_item(raw: &str) -> Result<(ProductId, u32), String> {
    let (id, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected <product-id>:<quantity>, got `{raw}`"))?;
    let id: ProductId = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid product id `{id}`"))?;
    let quantity: u32 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity `{quantity}`"))?;
    if quantity == 0 {
        return Err("quantity must be at least 1".to_string());
    }
    Ok((id, quantity))
}
