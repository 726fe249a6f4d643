//! `market-cli products` handlers.

use rust_decimal::Decimal;

use marketfront_core::{
    ApiError, CreateProductRequest, PageRequest, ProductId, UpdateProductRequest,
};
use marketfront_store::AppStore;

use super::print_json;

pub async fn list(store: &AppStore, page: u32, size: u32) -> Result<(), ApiError> {
    store
        .products()
        .fetch_products(PageRequest { page, size })
        .await?;
    print_json(&store.products().state());
    Ok(())
}

pub async fn get(store: &AppStore, id: ProductId) -> Result<(), ApiError> {
    store.products().fetch_product(id).await?;
    print_json(&store.products().state().current_product);
    Ok(())
}

pub async fn search(store: &AppStore, query: &str, page: u32, size: u32) -> Result<(), ApiError> {
    store
        .products()
        .search(query, PageRequest { page, size })
        .await?;
    print_json(&store.products().state());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    store: &AppStore,
    name: String,
    description: String,
    price: Decimal,
    stock_quantity: u32,
    category: String,
    image_url: Option<String>,
    sku: Option<String>,
) -> Result<(), ApiError> {
    store
        .products()
        .create(CreateProductRequest {
            name,
            description,
            price,
            stock_quantity,
            category,
            image_url,
            sku,
        })
        .await?;
    print_json(&store.products().state().products.first());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn update(
    store: &AppStore,
    id: ProductId,
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    stock_quantity: Option<u32>,
    category: Option<String>,
    image_url: Option<String>,
    sku: Option<String>,
) -> Result<(), ApiError> {
    // Focus the product first so the updated copy lands in
    // `current_product` for printing.
    store.products().fetch_product(id).await?;
    store
        .products()
        .update(UpdateProductRequest {
            id,
            name,
            description,
            price,
            stock_quantity,
            category,
            image_url,
            sku,
        })
        .await?;
    print_json(&store.products().state().current_product);
    Ok(())
}

pub async fn delete(store: &AppStore, id: ProductId) -> Result<(), ApiError> {
    store.products().delete(id).await
}
