//! User-facing notification seam.
//!
//! The HTTP layer performs all notification for transport and HTTP-level
//! failures; state slices add success toasts. UI embedders implement
//! [`Notify`] to render toast-style messages and to react to forced
//! logout ([`Notify::session_expired`]).

use std::sync::{Mutex, PoisonError};

/// Toast-style, non-blocking user notifications.
pub trait Notify: Send + Sync {
    fn success(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);

    /// The current session was rejected (401); the UI should navigate to
    /// the login route. Default is a no-op for headless embedders.
    fn session_expired(&self) {}
}

/// Routes notifications to `tracing` events.
///
/// The default for headless use; a UI would replace this with its own
/// toast renderer.
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(kind = "success", "{message}");
    }

    fn info(&self, message: &str) {
        tracing::info!(kind = "info", "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(kind = "warning", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(kind = "error", "{message}");
    }

    fn session_expired(&self) {
        tracing::warn!("Session expired; login required");
    }
}

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
    SessionExpired,
}

/// Records notifications in memory, in emission order.
///
/// Used by tests and available to headless embedders that want to drain
/// messages themselves.
#[derive(Default)]
pub struct MemoryNotifier {
    events: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Notification) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// All recorded notifications, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Just the error messages, oldest first.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Notification::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Just the success messages, oldest first.
    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Notification::Success(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Whether a session-expired signal was recorded.
    #[must_use]
    pub fn saw_session_expired(&self) -> bool {
        self.events()
            .iter()
            .any(|event| *event == Notification::SessionExpired)
    }

    /// Drop all recorded notifications.
    pub fn reset(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notify for MemoryNotifier {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(Notification::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(Notification::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }

    fn session_expired(&self) {
        self.push(Notification::SessionExpired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.success("a");
        notifier.error("b");
        notifier.session_expired();
        assert_eq!(
            notifier.events(),
            vec![
                Notification::Success("a".to_string()),
                Notification::Error("b".to_string()),
                Notification::SessionExpired,
            ]
        );
        assert_eq!(notifier.errors(), vec!["b".to_string()]);
        assert!(notifier.saw_session_expired());

        notifier.reset();
        assert!(notifier.events().is_empty());
    }
}
