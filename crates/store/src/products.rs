//! Product catalog state slice.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use serde::Serialize;

use marketfront_client::{ApiClient, Notify};
use marketfront_core::{
    ApiError, CreateProductRequest, Page, PageRequest, Product, ProductId,
    UpdateProductRequest,
};

/// Product catalog state.
///
/// `products` holds the backend's display order for the current page;
/// `current_page`/`total_pages` form the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ProductsState {
    pub products: Vec<Product>,
    pub current_product: Option<Product>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_pages: u32,
    pub current_page: u32,
}

/// State slice owning the product catalog.
pub struct ProductSlice {
    state: RwLock<ProductsState>,
    client: ApiClient,
    notifier: Arc<dyn Notify>,
}

impl ProductSlice {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let notifier = client.notifier();
        Self {
            state: RwLock::new(ProductsState::default()),
            client,
            notifier,
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn state(&self) -> ProductsState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProductsState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        let mut state = self.write();
        state.loading = true;
        state.error = None;
    }

    fn settle_rejected(&self, error: &ApiError) {
        let mut state = self.write();
        state.loading = false;
        state.error = Some(error.message.clone());
    }

    fn settle_page(&self, page: Page<Product>) {
        let mut state = self.write();
        state.loading = false;
        state.error = None;
        state.products = page.content;
        state.total_pages = page.total_pages;
        state.current_page = page.number;
    }

    /// Clear the inline error message.
    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Drop the single-item focus.
    pub fn clear_current_product(&self) {
        self.write().current_product = None;
    }

    /// Fetch a catalog page, replacing the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn fetch_products(&self, page: PageRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.products(page).await {
            Ok(page) => {
                self.settle_page(page);
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Search by name or category, replacing the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn search(&self, query: &str, page: PageRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.search_products(query, page).await {
            Ok(page) => {
                self.settle_page(page);
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Fetch a single product into the single-item focus.
    ///
    /// Does not touch the sequence.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn fetch_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.begin();
        match self.client.product(id).await {
            Ok(product) => {
                let mut state = self.write();
                state.loading = false;
                state.error = None;
                state.current_product = Some(product);
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Create a product and prepend it to the sequence (no refetch).
    ///
    /// Two rapid calls produce two requests and two prepends; there is no
    /// de-duplication.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn create(&self, request: CreateProductRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.create_product(&request).await {
            Ok(product) => {
                {
                    let mut state = self.write();
                    state.loading = false;
                    state.error = None;
                    state.products.insert(0, product);
                }
                self.notifier.success("Product created successfully!");
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Update a product, replacing the matching entry in place by id.
    ///
    /// An id absent from the current sequence is silently ignored; the
    /// single-item focus is refreshed when its id matches.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn update(&self, request: UpdateProductRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_product(&request).await {
            Ok(product) => {
                {
                    let mut state = self.write();
                    state.loading = false;
                    state.error = None;
                    if let Some(entry) =
                        state.products.iter_mut().find(|p| p.id == product.id)
                    {
                        *entry = product.clone();
                    }
                    if state
                        .current_product
                        .as_ref()
                        .is_some_and(|current| current.id == product.id)
                    {
                        state.current_product = Some(product);
                    }
                }
                self.notifier.success("Product updated successfully!");
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Delete a product, removing the matching entry by id.
    ///
    /// Idempotent with respect to the sequence: deleting an id that is
    /// already gone leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        self.begin();
        match self.client.delete_product(id).await {
            Ok(()) => {
                {
                    let mut state = self.write();
                    state.loading = false;
                    state.error = None;
                    state.products.retain(|p| p.id != id);
                }
                self.notifier.success("Product deleted successfully!");
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }
}
