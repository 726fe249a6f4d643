//! Domain types for Marketfront.
//!
//! All wire-facing types use camelCase field names to match the backend's
//! JSON contract.

pub mod id;
pub mod order;
pub mod page;
pub mod product;
pub mod user;

pub use id::*;
pub use order::{
    CreateOrderRequest, Order, OrderItem, OrderStatus, UpdateOrderStatusRequest,
};
pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use product::{CreateProductRequest, Product, UpdateProductRequest};
pub use user::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserRole,
};
