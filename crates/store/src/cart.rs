//! Client-only shopping cart.
//!
//! The cart belongs to the product-browsing view. It never reaches the
//! backend until checkout, when it is transformed into a
//! [`CreateOrderRequest`]. Stock bounds are checked client-side at
//! add/update time so the user hears about them without a network round
//! trip.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use marketfront_core::{CreateOrderRequest, OrderItem, Product, ProductId};

/// Errors surfaced inline by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity exceeds the product's stock at add-time.
    #[error("Cannot add more than available stock")]
    StockExceeded {
        product_id: ProductId,
        stock_quantity: u32,
    },
    /// The product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// One cart line: a product snapshot plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

/// Shopping cart keyed by product id, in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct cart lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Live total: sum of `quantity * price` across all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.product.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Add one unit of a product.
    ///
    /// A new product enters at quantity 1; an existing line is
    /// incremented. The quantity never exceeds the product's stock at
    /// add-time.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockExceeded`] when the line is already at
    /// the stock bound (the quantity is left unchanged).
    pub fn add(&mut self, product: &Product) -> Result<u32, CartError> {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            if item.quantity < product.stock_quantity {
                item.quantity += 1;
                return Ok(item.quantity);
            }
            return Err(CartError::StockExceeded {
                product_id: product.id,
                stock_quantity: product.stock_quantity,
            });
        }

        if product.stock_quantity == 0 {
            return Err(CartError::StockExceeded {
                product_id: product.id,
                stock_quantity: 0,
            });
        }
        self.items.push(CartItem {
            product: product.clone(),
            quantity: 1,
        });
        Ok(1)
    }

    /// Set a line's quantity directly.
    ///
    /// Quantity 0 removes the line; anything above the stock bound is
    /// rejected and the line is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] or [`CartError::StockExceeded`].
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.product.id == product_id)
        else {
            return Err(CartError::NotInCart(product_id));
        };

        if quantity == 0 {
            self.items.remove(index);
            return Ok(());
        }

        let Some(item) = self.items.get_mut(index) else {
            return Err(CartError::NotInCart(product_id));
        };
        if quantity > item.product.stock_quantity {
            return Err(CartError::StockExceeded {
                product_id,
                stock_quantity: item.product.stock_quantity,
            });
        }
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line entirely; absent ids are a no-op.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product.id != product_id);
    }

    /// Empty the cart. Called on successful checkout.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Transform the cart into an order request for checkout.
    #[must_use]
    pub fn to_order_request(&self, shipping_address: impl Into<String>) -> CreateOrderRequest {
        CreateOrderRequest {
            items: self
                .items
                .iter()
                .map(|item| OrderItem {
                    id: None,
                    product_id: item.product.id,
                    product_name: Some(item.product.name.clone()),
                    quantity: item.quantity,
                    price: item.product.price,
                })
                .collect(),
            shipping_address: shipping_address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, price: Decimal, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price,
            stock_quantity: stock,
            category: "Other".to_string(),
            image_url: None,
            sku: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_new_product_inserts_quantity_one() {
        let mut cart = Cart::new();
        let mug = product(1, Decimal::new(1250, 2), 5);
        assert_eq!(cart.add(&mug).expect("add"), 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_add_never_exceeds_stock() {
        let mut cart = Cart::new();
        let pen = product(2, Decimal::ONE, 2);
        cart.add(&pen).expect("first");
        cart.add(&pen).expect("second");
        let err = cart.add(&pen).expect_err("at stock bound");
        assert_eq!(
            err,
            CartError::StockExceeded {
                product_id: ProductId::new(2),
                stock_quantity: 2,
            }
        );
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_out_of_stock_product() {
        let mut cart = Cart::new();
        let gone = product(3, Decimal::ONE, 0);
        assert!(cart.add(&gone).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_bounds() {
        let mut cart = Cart::new();
        let mug = product(1, Decimal::new(1250, 2), 5);
        cart.add(&mug).expect("add");

        cart.set_quantity(mug.id, 4).expect("within stock");
        assert_eq!(cart.item_count(), 4);

        assert!(cart.set_quantity(mug.id, 6).is_err());
        assert_eq!(cart.item_count(), 4);

        cart.set_quantity(mug.id, 0).expect("zero removes");
        assert!(cart.is_empty());

        assert_eq!(
            cart.set_quantity(mug.id, 1),
            Err(CartError::NotInCart(mug.id))
        );
    }

    #[test]
    fn test_total_is_live_sum() {
        let mut cart = Cart::new();
        let mug = product(1, Decimal::new(1250, 2), 5);
        let pen = product(2, Decimal::new(199, 2), 10);
        cart.add(&mug).expect("add");
        cart.add(&mug).expect("add");
        cart.add(&pen).expect("add");

        // 2 * 12.50 + 1 * 1.99
        assert_eq!(cart.total(), Decimal::new(2699, 2));

        cart.remove(mug.id);
        assert_eq!(cart.total(), Decimal::new(199, 2));
    }

    #[test]
    fn test_checkout_request_carries_snapshots() {
        let mut cart = Cart::new();
        let mug = product(1, Decimal::new(1250, 2), 5);
        let pen = product(2, Decimal::new(199, 2), 10);
        cart.add(&mug).expect("add");
        cart.add(&mug).expect("add");
        cart.add(&pen).expect("add");

        let request = cart.to_order_request("1 Main St");
        assert_eq!(request.items.len(), 2);
        let first = request.items.first().expect("first item");
        assert_eq!(first.product_id, mug.id);
        assert_eq!(first.quantity, 2);
        assert_eq!(first.price, mug.price);
        assert_eq!(first.product_name.as_deref(), Some("Product 1"));
        assert_eq!(request.shipping_address, "1 Main St");

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
