//! Typed API client for the storefront backend.
//!
//! One method per backend operation, each performing exactly one request.
//! Two interceptor-style behaviors wrap every call:
//!
//! - Request phase: the bearer token is re-read from persistent storage
//!   and attached as the `Authorization` header when present.
//! - Response phase: failures are classified by status code, surfaced to
//!   the user through the [`Notify`] seam, and normalized to [`ApiError`].
//!   A 401 additionally tears down the persisted session and fires
//!   [`Notify::session_expired`].
//!
//! Callers only ever see [`ApiError`]; raw `reqwest` errors never escape
//! this module.

use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use marketfront_core::error::GENERIC_ERROR_MESSAGE;
use marketfront_core::{
    ApiError, AuthResponse, CreateOrderRequest, CreateProductRequest, LoginRequest, Order,
    OrderId, OrderStatus, Page, PageRequest, Product, ProductId, RegisterRequest,
    UpdateOrderStatusRequest, UpdateProductRequest, UpdateProfileRequest, User,
};

use crate::config::{ClientConfig, ConfigError};
use crate::notify::Notify;
use crate::storage::{self, Storage, keys};

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheaply cloneable; all clones share one connection pool, one storage
/// handle, and one notifier.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notify>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notify>,
    ) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                storage,
                notifier,
            }),
        })
    }

    /// The persistent storage shared with this client.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.inner.storage)
    }

    /// The notifier shared with this client.
    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notify> {
        Arc::clone(&self.inner.notifier)
    }

    /// Build a request, attaching the bearer token when one is stored.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let mut builder = self.inner.http.request(method, url);
        if let Some(token) =
            storage::get_json::<String>(self.inner.storage.as_ref(), keys::TOKEN)
        {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and return the raw body of a successful response.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => return Err(self.transport_failure(&error)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => return Err(self.transport_failure(&error)),
        };

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_failure(
                status.as_u16(),
                &body,
                self.inner.storage.as_ref(),
                self.inner.notifier.as_ref(),
            ))
        }
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.dispatch(builder).await?;
        serde_json::from_str(&body).map_err(|error| {
            tracing::error!(
                %error,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to decode response body"
            );
            self.inner.notifier.error("An unexpected error occurred.");
            ApiError::unexpected(error.to_string())
        })
    }

    /// Send a request expecting no response body (204 / empty 200).
    async fn send_no_content(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.dispatch(builder).await.map(drop)
    }

    /// Map a transport-level failure to the normalized error.
    fn transport_failure(&self, error: &reqwest::Error) -> ApiError {
        if error.is_builder() {
            // The request never left the client.
            tracing::error!(%error, "Request construction failed");
            self.inner.notifier.error("An unexpected error occurred.");
            ApiError::unexpected(error.to_string())
        } else {
            tracing::warn!(%error, "No response received");
            self.inner
                .notifier
                .error("Network error. Please check your connection.");
            ApiError::network()
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the normalized error when credentials are rejected or the
    /// request fails.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.request(Method::POST, "/auth/login").json(request))
            .await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; 422 carries field-scoped messages.
    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(self.request(Method::POST, "/auth/register").json(request))
            .await
    }

    /// Invalidate the session server-side.
    ///
    /// # Errors
    ///
    /// Returns the normalized error if the backend call fails; local
    /// session teardown is the caller's concern and happens regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send_no_content(self.request(Method::POST, "/auth/logout"))
            .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns the normalized error, including 401 when unauthenticated.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.send(self.request(Method::GET, "/users/profile")).await
    }

    /// Update the current user's profile.
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        self.send(self.request(Method::PUT, "/users/profile").json(request))
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, paginated.
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip(self))]
    pub async fn products(&self, page: PageRequest) -> Result<Page<Product>, ApiError> {
        self.send(self.request(Method::GET, "/products").query(&page))
            .await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns the normalized error, including 404 when absent.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.send(self.request(Method::GET, &format!("/products/{id}")))
            .await
    }

    /// Create a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns the normalized error; 422 carries field-scoped messages.
    #[instrument(skip_all)]
    pub async fn create_product(
        &self,
        request: &CreateProductRequest,
    ) -> Result<Product, ApiError> {
        self.send(self.request(Method::POST, "/products").json(request))
            .await
    }

    /// Update a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip_all, fields(id = %request.id))]
    pub async fn update_product(
        &self,
        request: &UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/products/{}", request.id))
                .json(request),
        )
        .await
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.send_no_content(self.request(Method::DELETE, &format!("/products/{id}")))
            .await
    }

    /// Search products by name or category, paginated.
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<Product>, ApiError> {
        self.send(
            self.request(Method::GET, "/products/search")
                .query(&[("query", query)])
                .query(&page),
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip_all)]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.send(self.request(Method::POST, "/orders").json(request))
            .await
    }

    /// List the current user's orders.
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.send(self.request(Method::GET, "/orders/user")).await
    }

    /// List all orders, paginated (admin only).
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip(self))]
    pub async fn orders(&self, page: PageRequest) -> Result<Page<Order>, ApiError> {
        self.send(self.request(Method::GET, "/orders").query(&page))
            .await
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Returns the normalized error, including 404 when absent.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.send(self.request(Method::GET, &format!("/orders/{id}")))
            .await
    }

    /// Update an order's status (admin only).
    ///
    /// # Errors
    ///
    /// Returns the normalized error.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/orders/{id}/status"))
                .json(&UpdateOrderStatusRequest { status }),
        )
        .await
    }
}

// =============================================================================
// Response classification
// =============================================================================

/// Error body shape emitted by the backend. Both fields are optional;
/// anything unparseable is treated as an empty body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Classify a non-2xx response: emit notifications, tear down the session
/// on 401, and build the normalized error.
fn classify_failure(
    status: u16,
    body: &str,
    storage: &dyn Storage,
    notifier: &dyn Notify,
) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    match status {
        401 => {
            // Session is gone; clear the persisted credentials and send
            // the user back to login.
            storage.remove(keys::TOKEN);
            storage.remove(keys::USER);
            notifier.error("Session expired. Please login again.");
            notifier.session_expired();
        }
        403 => {
            notifier.error("You do not have permission to perform this action.");
        }
        404 => {
            notifier.error(parsed.message.as_deref().unwrap_or("Resource not found."));
        }
        422 => {
            if let Some(fields) = &parsed.errors {
                for message in fields.values().flatten() {
                    notifier.error(message);
                }
            } else {
                notifier.error(
                    parsed
                        .message
                        .as_deref()
                        .unwrap_or("Validation error occurred."),
                );
            }
        }
        500 => {
            notifier.error("Server error. Please try again later.");
        }
        _ => {
            notifier.error(
                parsed
                    .message
                    .as_deref()
                    .unwrap_or("An error occurred. Please try again."),
            );
        }
    }

    ApiError {
        message: parsed
            .message
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
        status,
        errors: parsed.errors,
    }
}
