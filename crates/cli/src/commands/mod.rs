//! Subcommand handlers.
//!
//! Each handler drives the store slice for its entity, then prints the
//! resulting state as JSON. Notifications (success toasts, session
//! expiry) are emitted by the store/client layers through the
//! [`marketfront_client::TracingNotifier`] wired up in `main`.

pub mod auth;
pub mod orders;
pub mod products;

use serde::Serialize;

/// Print a value as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to serialize output: {e}"),
    }
}
