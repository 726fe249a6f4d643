//! Order book state slice.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use serde::Serialize;

use marketfront_client::{ApiClient, Notify};
use marketfront_core::{
    ApiError, CreateOrderRequest, Order, OrderId, OrderStatus, PageRequest,
};

/// Order book state.
///
/// `orders` is most-recent-first after creation; `current_order` is the
/// single-item focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct OrdersState {
    pub orders: Vec<Order>,
    pub current_order: Option<Order>,
    pub loading: bool,
    pub error: Option<String>,
}

/// State slice owning the order book.
pub struct OrderSlice {
    state: RwLock<OrdersState>,
    client: ApiClient,
    notifier: Arc<dyn Notify>,
}

impl OrderSlice {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let notifier = client.notifier();
        Self {
            state: RwLock::new(OrdersState::default()),
            client,
            notifier,
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn state(&self) -> OrdersState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrdersState> {
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

    fn settle_sequence(&self, orders: Vec<Order>) {
        let mut state = self.write();
        state.loading = false;
        state.error = None;
        state.orders = orders;
    }

    /// Clear the inline error message.
    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Drop the single-item focus.
    pub fn clear_current_order(&self) {
        self.write().current_order = None;
    }

    /// Place an order; the result is prepended and becomes the focus.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn create(&self, request: CreateOrderRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.create_order(&request).await {
            Ok(order) => {
                {
                    let mut state = self.write();
                    state.loading = false;
                    state.error = None;
                    state.orders.insert(0, order.clone());
                    state.current_order = Some(order);
                }
                self.notifier.success("Order placed successfully!");
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Fetch the current user's orders, replacing the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn fetch_my_orders(&self) -> Result<(), ApiError> {
        self.begin();
        match self.client.my_orders().await {
            Ok(orders) => {
                self.settle_sequence(orders);
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Fetch a page of all orders (admin), replacing the whole sequence
    /// with the page's content.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn fetch_all(&self, page: PageRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.orders(page).await {
            Ok(page) => {
                self.settle_sequence(page.content);
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Fetch a single order into the single-item focus.
    ///
    /// Does not touch the sequence.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn fetch_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.begin();
        match self.client.order(id).await {
            Ok(order) => {
                let mut state = self.write();
                state.loading = false;
                state.error = None;
                state.current_order = Some(order);
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Update an order's status (admin), replacing the matching entry in
    /// place and the focus when ids match.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_order_status(id, status).await {
            Ok(order) => {
                {
                    let mut state = self.write();
                    state.loading = false;
                    state.error = None;
                    if let Some(entry) = state.orders.iter_mut().find(|o| o.id == order.id) {
                        *entry = order.clone();
                    }
                    if state
                        .current_order
                        .as_ref()
                        .is_some_and(|current| current.id == order.id)
                    {
                        state.current_order = Some(order);
                    }
                }
                self.notifier.success("Order status updated successfully!");
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }
}
