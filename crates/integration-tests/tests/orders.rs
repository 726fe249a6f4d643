//! Orders: checkout from a cart, history, and admin status updates.

use rust_decimal::Decimal;

use marketfront_core::{OrderStatus, PageRequest, UserRole};
use marketfront_integration_tests::TestContext;
use marketfront_store::Cart;

async fn shopper_ctx() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.backend
        .seed_product("Blue Mug", "Kitchen", Decimal::new(1250, 2), 5);
    ctx.backend
        .seed_product("Red Pen", "Office", Decimal::new(199, 2), 20);
    ctx.backend
        .seed_user("shopper@example.com", "Sam", "secret", UserRole::User);
    ctx.login("shopper@example.com", "secret").await;
    ctx
}

/// Build a two-line cart from the seeded catalog.
async fn seeded_cart(ctx: &TestContext) -> Cart {
    let mug = ctx
        .client
        .product(marketfront_core::ProductId::new(1))
        .await
        .expect("mug");
    let pen = ctx
        .client
        .product(marketfront_core::ProductId::new(2))
        .await
        .expect("pen");

    let mut cart = Cart::new();
    cart.add(&mug).expect("add mug");
    cart.add(&mug).expect("add mug again");
    cart.add(&pen).expect("add pen");
    cart
}

#[tokio::test]
async fn test_checkout_prepends_and_focuses_the_new_order() {
    let ctx = shopper_ctx().await;
    let cart = seeded_cart(&ctx).await;
    ctx.notifier.reset();

    ctx.store
        .orders()
        .create(cart.to_order_request("1 Main St"))
        .await
        .expect("checkout");

    let state = ctx.store.orders().state();
    let placed = state.current_order.expect("focused order");
    assert_eq!(state.orders.first().map(|o| o.id), Some(placed.id));
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.items.len(), 2);
    // 2 * 12.50 + 1 * 1.99, computed server-side.
    assert_eq!(placed.total_amount, Decimal::new(2699, 2));
    assert_eq!(placed.shipping_address, "1 Main St");
    assert_eq!(
        ctx.notifier.successes(),
        vec!["Order placed successfully!".to_string()]
    );
}

#[tokio::test]
async fn test_my_orders_returns_only_own_orders() {
    let ctx = shopper_ctx().await;
    let cart = seeded_cart(&ctx).await;
    ctx.store
        .orders()
        .create(cart.to_order_request("1 Main St"))
        .await
        .expect("first order");

    // A second shopper places their own order.
    ctx.backend
        .seed_user("other@example.com", "Omar", "secret", UserRole::User);
    ctx.login("other@example.com", "secret").await;
    let cart = seeded_cart(&ctx).await;
    ctx.store
        .orders()
        .create(cart.to_order_request("2 Side St"))
        .await
        .expect("second order");

    // Back to the first shopper.
    ctx.login("shopper@example.com", "secret").await;
    ctx.store.orders().fetch_my_orders().await.expect("history");

    let state = ctx.store.orders().state();
    assert_eq!(state.orders.len(), 1);
    assert_eq!(
        state.orders.first().map(|o| o.shipping_address.as_str()),
        Some("1 Main St")
    );
}

#[tokio::test]
async fn test_order_listing_requires_admin() {
    let ctx = shopper_ctx().await;

    let err = ctx
        .store
        .orders()
        .fetch_all(PageRequest::first())
        .await
        .expect_err("not an admin");

    assert_eq!(err.status, 403);
    let state = ctx.store.orders().state();
    assert_eq!(state.error.as_deref(), Some("Access denied"));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_fetch_order_sets_focus_without_touching_sequence() {
    let ctx = shopper_ctx().await;
    let cart = seeded_cart(&ctx).await;
    ctx.store
        .orders()
        .create(cart.to_order_request("1 Main St"))
        .await
        .expect("checkout");
    ctx.store.orders().fetch_my_orders().await.expect("history");
    let before = ctx.store.orders().state().orders;

    let target = before.first().expect("order").id;
    ctx.store.orders().clear_current_order();
    ctx.store.orders().fetch_order(target).await.expect("fetch one");

    let state = ctx.store.orders().state();
    assert_eq!(state.current_order.map(|o| o.id), Some(target));
    assert_eq!(state.orders, before);
}

#[tokio::test]
async fn test_admin_status_update_replaces_in_place() {
    let ctx = shopper_ctx().await;
    let cart = seeded_cart(&ctx).await;
    ctx.store
        .orders()
        .create(cart.to_order_request("1 Main St"))
        .await
        .expect("checkout");

    ctx.backend
        .seed_user("admin@example.com", "Ada", "secret", UserRole::Admin);
    ctx.login("admin@example.com", "secret").await;
    ctx.store
        .orders()
        .fetch_all(PageRequest::first())
        .await
        .expect("all orders");
    let target = ctx
        .store
        .orders()
        .state()
        .orders
        .first()
        .expect("order")
        .id;

    ctx.store
        .orders()
        .update_status(target, OrderStatus::Shipped)
        .await
        .expect("update status");

    let state = ctx.store.orders().state();
    let entry = state
        .orders
        .iter()
        .find(|o| o.id == target)
        .expect("updated entry");
    assert_eq!(entry.status, OrderStatus::Shipped);
    assert_eq!(state.orders.len(), 1);
    assert_eq!(
        ctx.backend.order(target).map(|o| o.status),
        Some(OrderStatus::Shipped)
    );
    assert_eq!(
        ctx.notifier.successes(),
        vec!["Order status updated successfully!".to_string()]
    );
}
