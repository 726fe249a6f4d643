//! End-to-end test harness.
//!
//! [`MockBackend`] is an in-process axum server speaking the same REST
//! contract as the real storefront backend: bearer-token auth, the
//! Spring-style page envelope, and `{message, errors}` failure bodies.
//! [`TestContext`] wires a real [`ApiClient`] and [`AppStore`] to it over
//! loopback HTTP, with in-memory storage and a recording notifier so
//! tests can assert on persisted session state and emitted toasts.
//!
//! ```no_run
//! # async fn demo() {
//! use marketfront_integration_tests::TestContext;
//!
//! let ctx = TestContext::new().await;
//! ctx.backend.seed_user("a@b.com", "Alice", "pw", marketfront_core::UserRole::User);
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test harness; failing loudly on setup errors is the point.
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use marketfront_client::{
    ApiClient, ClientConfig, MemoryNotifier, MemoryStorage, Notify, Storage,
};
use marketfront_core::{
    AuthResponse, CreateOrderRequest, CreateProductRequest, LoginRequest, Order, OrderId,
    OrderStatus, Page, PageRequest, Product, ProductId, RegisterRequest, UpdateOrderStatusRequest,
    UpdateProductRequest, UpdateProfileRequest, User, UserId, UserRole,
};
use marketfront_store::AppStore;

// =============================================================================
// Test context
// =============================================================================

/// A full client stack wired to a fresh mock backend.
pub struct TestContext {
    pub backend: MockBackend,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<MemoryNotifier>,
    pub client: ApiClient,
    pub store: AppStore,
}

impl TestContext {
    /// Start a mock backend and build a store on top of it.
    pub async fn new() -> Self {
        let backend = MockBackend::start().await;
        let storage = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let storage_handle: Arc<dyn Storage> = storage.clone();
        let notifier_handle: Arc<dyn Notify> = notifier.clone();
        let client = ApiClient::new(
            &ClientConfig::new(backend.url()),
            storage_handle,
            notifier_handle,
        )
        .expect("build client");
        let store = AppStore::new(client.clone());
        Self {
            backend,
            storage,
            notifier,
            client,
            store,
        }
    }

    /// Log in through the store and drop the notifications it produced.
    pub async fn login(&self, email: &str, password: &str) {
        self.store
            .auth()
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .expect("login");
        self.notifier.reset();
    }
}

// =============================================================================
// Mock backend
// =============================================================================

type SharedDb = Arc<Mutex<MockDb>>;

#[derive(Default)]
struct MockDb {
    users: Vec<User>,
    passwords: BTreeMap<String, String>,
    tokens: BTreeMap<String, UserId>,
    products: Vec<Product>,
    orders: Vec<Order>,
    next_user: i64,
    next_product: i64,
    next_order: i64,
    next_token: u64,
    fail_logout: bool,
    latency: Option<Duration>,
}

impl MockDb {
    fn issue_token(&mut self, user_id: UserId) -> String {
        self.next_token += 1;
        let token = format!("mock-token-{}", self.next_token);
        self.tokens.insert(token.clone(), user_id);
        token
    }
}

/// In-process HTTP server imitating the storefront backend.
pub struct MockBackend {
    db: SharedDb,
    addr: SocketAddr,
}

impl MockBackend {
    /// Bind an ephemeral loopback port and start serving.
    pub async fn start() -> Self {
        let db: SharedDb = Arc::new(Mutex::new(MockDb::default()));
        let app = router(Arc::clone(&db));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self { db, addr }
    }

    /// Base URL the client should be pointed at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    fn db(&self) -> MutexGuard<'_, MockDb> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user directly in the backend.
    pub fn seed_user(&self, email: &str, first_name: &str, password: &str, role: UserRole) -> User {
        let mut db = self.db();
        db.next_user += 1;
        let user = User {
            id: UserId::new(db.next_user),
            email: email.to_string(),
            username: email.split('@').next().unwrap_or(email).to_string(),
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            role,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        db.passwords.insert(email.to_string(), password.to_string());
        db.users.push(user.clone());
        user
    }

    /// Add a product directly to the catalog.
    pub fn seed_product(&self, name: &str, category: &str, price: Decimal, stock: u32) -> Product {
        let mut db = self.db();
        db.next_product += 1;
        let product = Product {
            id: ProductId::new(db.next_product),
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            stock_quantity: stock,
            category: category.to_string(),
            image_url: None,
            sku: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        db.products.push(product.clone());
        product
    }

    /// Delay every subsequent response by the given duration.
    pub fn set_latency(&self, latency: Duration) {
        self.db().latency = Some(latency);
    }

    /// Make `POST /auth/logout` fail with a 500 from now on.
    pub fn fail_logout(&self) {
        self.db().fail_logout = true;
    }

    /// A token the backend does not recognize, for forcing 401s.
    #[must_use]
    pub fn bogus_token() -> &'static str {
        "mock-token-expired"
    }

    /// The backend's copy of a product, if it still exists.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.db().products.iter().find(|p| p.id == id).cloned()
    }

    /// The backend's copy of an order, if it exists.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.db().orders.iter().find(|o| o.id == id).cloned()
    }
}

// =============================================================================
// Routing
// =============================================================================

fn router(db: SharedDb) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/users/profile", get(profile).put(update_profile))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/search", get(search_products))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/user", get(my_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", patch(update_order_status))
        .layer(middleware::from_fn_with_state(Arc::clone(&db), delay))
        .with_state(db)
}

async fn delay(State(db): State<SharedDb>, request: Request, next: Next) -> Response {
    let latency = db.lock().unwrap_or_else(PoisonError::into_inner).latency;
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
    next.run(request).await
}

// =============================================================================
// Failure bodies
// =============================================================================

/// A `{message, errors?}` failure response.
struct Failure {
    status: StatusCode,
    message: String,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    fn validation(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), vec![message.to_string()]);
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "Validation failed".to_string(),
            errors: Some(errors),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Invalid or expired session")
    }

    fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Access denied")
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut body = json!({ "message": self.message });
        if let Some(errors) = self.errors
            && let Some(map) = body.as_object_mut()
        {
            map.insert("errors".to_string(), json!(errors));
        }
        (self.status, Json(body)).into_response()
    }
}

fn lock(db: &SharedDb) -> MutexGuard<'_, MockDb> {
    db.lock().unwrap_or_else(PoisonError::into_inner)
}

fn authenticate(db: &MockDb, headers: &HeaderMap) -> Result<User, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(Failure::unauthorized)?;
    let user_id = db.tokens.get(token).ok_or_else(Failure::unauthorized)?;
    db.users
        .iter()
        .find(|user| user.id == *user_id)
        .cloned()
        .ok_or_else(Failure::unauthorized)
}

fn require_admin(user: &User) -> Result<(), Failure> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(Failure::forbidden())
    }
}

fn paginate<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let size = request.size.max(1);
    let start = request.page as usize * size as usize;
    Page {
        content: items.iter().skip(start).take(size as usize).cloned().collect(),
        total_elements: u64::try_from(items.len()).unwrap_or(u64::MAX),
        total_pages: u32::try_from(items.len().div_ceil(size as usize)).unwrap_or(u32::MAX),
        size,
        number: request.page,
    }
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn login(
    State(db): State<SharedDb>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Failure> {
    let mut db = lock(&db);
    let known = db
        .passwords
        .get(&request.email)
        .is_some_and(|password| *password == request.password);
    if !known {
        return Err(Failure::new(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }
    let user = db
        .users
        .iter()
        .find(|user| user.email == request.email)
        .cloned()
        .ok_or_else(Failure::unauthorized)?;
    let token = db.issue_token(user.id);
    Ok(Json(AuthResponse { token, user }))
}

async fn register(
    State(db): State<SharedDb>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, Failure> {
    let mut db = lock(&db);
    if db.users.iter().any(|user| user.email == request.email) {
        return Err(Failure::validation("email", "is already taken"));
    }
    if request.password.len() < 6 {
        return Err(Failure::validation("password", "is too short"));
    }
    db.next_user += 1;
    let user = User {
        id: UserId::new(db.next_user),
        email: request.email.clone(),
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        role: UserRole::User,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    db.passwords.insert(request.email, request.password);
    db.users.push(user.clone());
    let token = db.issue_token(user.id);
    Ok(Json(AuthResponse { token, user }))
}

async fn logout(State(db): State<SharedDb>, headers: HeaderMap) -> Result<StatusCode, Failure> {
    let mut db = lock(&db);
    if db.fail_logout {
        return Err(Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        ));
    }
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        db.tokens.remove(token);
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// User handlers
// =============================================================================

async fn profile(State(db): State<SharedDb>, headers: HeaderMap) -> Result<Json<User>, Failure> {
    let db = lock(&db);
    authenticate(&db, &headers).map(Json)
}

async fn update_profile(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, Failure> {
    let mut db = lock(&db);
    let id = authenticate(&db, &headers)?.id;
    let user = db
        .users
        .iter_mut()
        .find(|user| user.id == id)
        .ok_or_else(Failure::unauthorized)?;
    if let Some(email) = request.email {
        user.email = email;
    }
    if let Some(username) = request.username {
        user.username = username;
    }
    if let Some(first_name) = request.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = request.last_name {
        user.last_name = last_name;
    }
    user.updated_at = Some(Utc::now());
    Ok(Json(user.clone()))
}

// =============================================================================
// Product handlers
// =============================================================================

async fn list_products(
    State(db): State<SharedDb>,
    Query(page): Query<PageRequest>,
) -> Json<Page<Product>> {
    let db = lock(&db);
    Json(paginate(&db.products, page))
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
    page: u32,
    size: u32,
}

async fn search_products(
    State(db): State<SharedDb>,
    Query(params): Query<SearchParams>,
) -> Json<Page<Product>> {
    let db = lock(&db);
    let needle = params.query.to_lowercase();
    let matches: Vec<Product> = db
        .products
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    Json(paginate(
        &matches,
        PageRequest {
            page: params.page,
            size: params.size,
        },
    ))
}

async fn get_product(
    State(db): State<SharedDb>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, Failure> {
    let db = lock(&db);
    db.products
        .iter()
        .find(|product| product.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Product not found"))
}

async fn create_product(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>, Failure> {
    let mut db = lock(&db);
    let user = authenticate(&db, &headers)?;
    require_admin(&user)?;
    if request.price <= Decimal::ZERO {
        return Err(Failure::validation("price", "must be greater than 0"));
    }
    db.next_product += 1;
    let product = Product {
        id: ProductId::new(db.next_product),
        name: request.name,
        description: request.description,
        price: request.price,
        stock_quantity: request.stock_quantity,
        category: request.category,
        image_url: request.image_url,
        sku: request.sku,
        created_at: Some(Utc::now()),
        updated_at: None,
    };
    db.products.push(product.clone());
    Ok(Json(product))
}

async fn update_product(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>, Failure> {
    let mut db = lock(&db);
    let user = authenticate(&db, &headers)?;
    require_admin(&user)?;
    let product = db
        .products
        .iter_mut()
        .find(|product| product.id == id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Product not found"))?;
    if let Some(name) = request.name {
        product.name = name;
    }
    if let Some(description) = request.description {
        product.description = description;
    }
    if let Some(price) = request.price {
        product.price = price;
    }
    if let Some(stock_quantity) = request.stock_quantity {
        product.stock_quantity = stock_quantity;
    }
    if let Some(category) = request.category {
        product.category = category;
    }
    if let Some(image_url) = request.image_url {
        product.image_url = Some(image_url);
    }
    if let Some(sku) = request.sku {
        product.sku = Some(sku);
    }
    product.updated_at = Some(Utc::now());
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, Failure> {
    let mut db = lock(&db);
    let user = authenticate(&db, &headers)?;
    require_admin(&user)?;
    // Deleting an absent product still succeeds.
    db.products.retain(|product| product.id != id);
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Order handlers
// =============================================================================

async fn create_order(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<Order>, Failure> {
    let mut db = lock(&db);
    let user = authenticate(&db, &headers)?;
    if request.items.is_empty() {
        return Err(Failure::validation("items", "must not be empty"));
    }
    db.next_order += 1;
    let order_id = db.next_order;
    let items: Vec<_> = request
        .items
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            item.id = Some(order_id * 100 + i64::try_from(index).unwrap_or_default());
            item
        })
        .collect();
    let total_amount = items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum();
    let order = Order {
        id: OrderId::new(order_id),
        user_id: user.id,
        items,
        total_amount,
        status: OrderStatus::Pending,
        shipping_address: request.shipping_address,
        created_at: Utc::now(),
        updated_at: None,
    };
    db.orders.push(order.clone());
    Ok(Json(order))
}

async fn my_orders(
    State(db): State<SharedDb>,
    headers: HeaderMap,
) -> Result<Json<Vec<Order>>, Failure> {
    let db = lock(&db);
    let user = authenticate(&db, &headers)?;
    // Most recent first, as the real backend sorts by creation date.
    let mut orders: Vec<Order> = db
        .orders
        .iter()
        .filter(|order| order.user_id == user.id)
        .cloned()
        .collect();
    orders.reverse();
    Ok(Json(orders))
}

async fn list_orders(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<Order>>, Failure> {
    let db = lock(&db);
    let user = authenticate(&db, &headers)?;
    require_admin(&user)?;
    Ok(Json(paginate(&db.orders, page)))
}

async fn get_order(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, Failure> {
    let db = lock(&db);
    let user = authenticate(&db, &headers)?;
    let order = db
        .orders
        .iter()
        .find(|order| order.id == id)
        .cloned()
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Order not found"))?;
    if order.user_id != user.id && !user.is_admin() {
        return Err(Failure::forbidden());
    }
    Ok(Json(order))
}

async fn update_order_status(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, Failure> {
    let mut db = lock(&db);
    let user = authenticate(&db, &headers)?;
    require_admin(&user)?;
    let order = db
        .orders
        .iter_mut()
        .find(|order| order.id == id)
        .ok_or_else(|| Failure::new(StatusCode::NOT_FOUND, "Order not found"))?;
    order.status = request.status;
    order.updated_at = Some(Utc::now());
    Ok(Json(order.clone()))
}
