//! Product catalog: pagination, search, and admin mutations.

use rust_decimal::Decimal;

use marketfront_core::{
    CreateProductRequest, PageRequest, ProductId, UpdateProductRequest, UserRole,
};
use marketfront_integration_tests::TestContext;

async fn seeded() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.backend
        .seed_product("Blue Mug", "Kitchen", Decimal::new(1250, 2), 5);
    ctx.backend
        .seed_product("Red Pen", "Office", Decimal::new(199, 2), 20);
    ctx.backend
        .seed_product("Mug Rack", "Kitchen", Decimal::new(3400, 2), 2);
    ctx
}

#[tokio::test]
async fn test_catalog_page_fetch() {
    let ctx = seeded().await;

    ctx.store
        .products()
        .fetch_products(PageRequest { page: 0, size: 2 })
        .await
        .expect("fetch page 0");
    let state = ctx.store.products().state();
    assert_eq!(state.products.len(), 2);
    assert_eq!(state.total_pages, 2);
    assert_eq!(state.current_page, 0);
    assert!(!state.loading);

    ctx.store
        .products()
        .fetch_products(PageRequest { page: 1, size: 2 })
        .await
        .expect("fetch page 1");
    let state = ctx.store.products().state();
    assert_eq!(state.products.len(), 1);
    assert_eq!(state.current_page, 1);
}

#[tokio::test]
async fn test_search_matches_name_and_category() {
    let ctx = seeded().await;

    ctx.store
        .products()
        .search("mug", PageRequest::first())
        .await
        .expect("search by name");
    assert_eq!(ctx.store.products().state().products.len(), 2);

    ctx.store
        .products()
        .search("office", PageRequest::first())
        .await
        .expect("search by category");
    let state = ctx.store.products().state();
    assert_eq!(state.products.len(), 1);
    assert_eq!(
        state.products.first().map(|p| p.name.as_str()),
        Some("Red Pen")
    );
}

#[tokio::test]
async fn test_fetch_product_sets_focus_without_touching_sequence() {
    let ctx = seeded().await;
    ctx.store
        .products()
        .fetch_products(PageRequest::first())
        .await
        .expect("fetch");
    let before = ctx.store.products().state().products;

    let target = before.first().expect("seeded product").id;
    ctx.store
        .products()
        .fetch_product(target)
        .await
        .expect("fetch one");

    let state = ctx.store.products().state();
    assert_eq!(state.current_product.map(|p| p.id), Some(target));
    assert_eq!(state.products, before);
}

#[tokio::test]
async fn test_missing_product_surfaces_server_message() {
    let ctx = TestContext::new().await;

    let err = ctx
        .store
        .products()
        .fetch_product(ProductId::new(999))
        .await
        .expect_err("absent product");

    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Product not found");
    assert_eq!(
        ctx.store.products().state().error.as_deref(),
        Some("Product not found")
    );
    assert_eq!(ctx.notifier.errors(), vec!["Product not found".to_string()]);
}

#[tokio::test]
async fn test_create_requires_admin() {
    let ctx = seeded().await;
    ctx.backend
        .seed_user("shopper@example.com", "Sam", "secret", UserRole::User);
    ctx.login("shopper@example.com", "secret").await;
    ctx.store
        .products()
        .fetch_products(PageRequest::first())
        .await
        .expect("fetch");
    let before = ctx.store.products().state().products;
    ctx.notifier.reset();

    let err = ctx
        .store
        .products()
        .create(CreateProductRequest {
            name: "Contraband".to_string(),
            description: String::new(),
            price: Decimal::ONE,
            stock_quantity: 1,
            category: "Other".to_string(),
            image_url: None,
            sku: None,
        })
        .await
        .expect_err("not an admin");

    assert_eq!(err.status, 403);
    assert_eq!(
        ctx.notifier.errors(),
        vec!["You do not have permission to perform this action.".to_string()]
    );
    assert_eq!(ctx.store.products().state().products, before);
}

#[tokio::test]
async fn test_admin_create_prepends_to_sequence() {
    let ctx = seeded().await;
    ctx.backend
        .seed_user("admin@example.com", "Ada", "secret", UserRole::Admin);
    ctx.login("admin@example.com", "secret").await;
    ctx.store
        .products()
        .fetch_products(PageRequest::first())
        .await
        .expect("fetch");

    ctx.store
        .products()
        .create(CreateProductRequest {
            name: "Green Teapot".to_string(),
            description: "Cast iron".to_string(),
            price: Decimal::new(4999, 2),
            stock_quantity: 3,
            category: "Kitchen".to_string(),
            image_url: None,
            sku: Some("TEA-001".to_string()),
        })
        .await
        .expect("create");

    let state = ctx.store.products().state();
    assert_eq!(
        state.products.first().map(|p| p.name.as_str()),
        Some("Green Teapot")
    );
    assert_eq!(state.products.len(), 4);
    assert_eq!(
        ctx.notifier.successes(),
        vec!["Product created successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_create_rejects_non_positive_price() {
    let ctx = TestContext::new().await;
    ctx.backend
        .seed_user("admin@example.com", "Ada", "secret", UserRole::Admin);
    ctx.login("admin@example.com", "secret").await;

    let err = ctx
        .store
        .products()
        .create(CreateProductRequest {
            name: "Free Lunch".to_string(),
            description: String::new(),
            price: Decimal::ZERO,
            stock_quantity: 1,
            category: "Other".to_string(),
            image_url: None,
            sku: None,
        })
        .await
        .expect_err("non-positive price");

    assert_eq!(err.status, 422);
    assert_eq!(err.flattened_messages(), vec!["must be greater than 0"]);
    assert_eq!(
        ctx.notifier.errors(),
        vec!["must be greater than 0".to_string()]
    );
}

#[tokio::test]
async fn test_update_replaces_in_place_and_ignores_absent_ids() {
    let ctx = seeded().await;
    ctx.backend
        .seed_user("admin@example.com", "Ada", "secret", UserRole::Admin);
    ctx.login("admin@example.com", "secret").await;

    // Page of two; the third product exists only on the backend.
    ctx.store
        .products()
        .fetch_products(PageRequest { page: 0, size: 2 })
        .await
        .expect("fetch");
    let before = ctx.store.products().state().products;
    let off_page = ProductId::new(3);
    assert!(before.iter().all(|p| p.id != off_page));

    // Updating a product outside the current sequence changes nothing locally.
    ctx.store
        .products()
        .update(UpdateProductRequest {
            price: Some(Decimal::new(9999, 2)),
            ..UpdateProductRequest::empty(off_page)
        })
        .await
        .expect("update off-page product");
    assert_eq!(ctx.store.products().state().products, before);

    // Updating an on-page product replaces it at the same position.
    let target = before.first().expect("first product").id;
    ctx.store
        .products()
        .update(UpdateProductRequest {
            price: Some(Decimal::new(777, 2)),
            ..UpdateProductRequest::empty(target)
        })
        .await
        .expect("update on-page product");

    let state = ctx.store.products().state();
    let updated = state.products.first().expect("first product");
    assert_eq!(updated.id, target);
    assert_eq!(updated.price, Decimal::new(777, 2));
    assert_eq!(state.products.len(), before.len());
}

#[tokio::test]
async fn test_delete_removes_and_repeat_delete_is_harmless() {
    let ctx = seeded().await;
    ctx.backend
        .seed_user("admin@example.com", "Ada", "secret", UserRole::Admin);
    ctx.login("admin@example.com", "secret").await;
    ctx.store
        .products()
        .fetch_products(PageRequest::first())
        .await
        .expect("fetch");

    let target = ctx
        .store
        .products()
        .state()
        .products
        .first()
        .expect("seeded product")
        .id;

    ctx.store.products().delete(target).await.expect("delete");
    let state = ctx.store.products().state();
    assert_eq!(state.products.len(), 2);
    assert!(state.products.iter().all(|p| p.id != target));
    assert!(ctx.backend.product(target).is_none());

    // The backend treats delete as idempotent; the sequence is unchanged.
    ctx.store.products().delete(target).await.expect("repeat delete");
    assert_eq!(ctx.store.products().state().products.len(), 2);
}
