//! Marketfront Core - Shared domain types.
//!
//! This crate provides the types shared across all Marketfront components:
//! - `client` - HTTP access layer talking to the storefront backend
//! - `store` - Application state slices (auth, products, orders) and cart
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no state.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Domain entities, request/response bodies, and the page envelope
//! - [`error`] - The normalized API error contract

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod types;

pub use error::ApiError;
pub use types::*;
