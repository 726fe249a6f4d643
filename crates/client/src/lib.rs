//! Marketfront client - HTTP access layer for the storefront backend.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] wraps a single `reqwest` client. Every outgoing
//!   request picks up the bearer token from persistent storage when one is
//!   present; every failed response is classified by status code, surfaced
//!   through the [`notify::Notify`] seam, and normalized to
//!   [`marketfront_core::ApiError`] before callers see it.
//! - [`storage`] provides the best-effort key-value persistence that
//!   carries the session token and cached profile across restarts.
//! - [`config`] loads the client configuration from the environment.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use marketfront_client::{ApiClient, ClientConfig, FileStorage, TracingNotifier};
//!
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(FileStorage::new(".market-cli.json"));
//! let notifier = Arc::new(TracingNotifier);
//! let client = ApiClient::new(&config, storage, notifier)?;
//!
//! let page = client.products(Default::default()).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod notify;
pub mod storage;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use notify::{MemoryNotifier, Notification, Notify, TracingNotifier};
pub use storage::{FileStorage, MemoryStorage, Storage};
