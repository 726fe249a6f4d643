//! Authentication state slice.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use serde::Serialize;

use marketfront_client::storage::{self, keys};
use marketfront_client::{ApiClient, Notify, Storage};
use marketfront_core::{
    ApiError, LoginRequest, RegisterRequest, UpdateProfileRequest, User,
};

/// Authentication state.
///
/// `is_authenticated` is true iff a token is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    const fn cleared(loading: bool, error: Option<String>) -> Self {
        Self {
            user: None,
            token: None,
            is_authenticated: false,
            loading,
            error,
        }
    }
}

/// State slice owning the current session.
pub struct AuthSlice {
    state: RwLock<AuthState>,
    client: ApiClient,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notify>,
}

impl AuthSlice {
    /// Create the slice, hydrating session state from persistent storage.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let storage = client.storage();
        let notifier = client.notifier();

        let token: Option<String> = storage::get_json(storage.as_ref(), keys::TOKEN);
        let user: Option<User> = storage::get_json(storage.as_ref(), keys::USER);
        let state = AuthState {
            is_authenticated: token.is_some(),
            user,
            token,
            loading: false,
            error: None,
        };

        Self {
            state: RwLock::new(state),
            client,
            storage,
            notifier,
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        let mut state = self.write();
        state.loading = true;
        state.error = None;
    }

    /// Clear the inline error message.
    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Replace the current user and refresh the persisted copy.
    pub fn update_user(&self, user: User) {
        storage::set_json(self.storage.as_ref(), keys::USER, &user);
        self.write().user = Some(user);
    }

    fn settle_session(&self, token: String, user: User) {
        storage::set_json(self.storage.as_ref(), keys::TOKEN, &token);
        storage::set_json(self.storage.as_ref(), keys::USER, &user);
        let mut state = self.write();
        *state = AuthState {
            user: Some(user),
            token: Some(token),
            is_authenticated: true,
            loading: false,
            error: None,
        };
    }

    /// Fail closed: a rejected login/register clears any existing session
    /// state, valid or not.
    fn settle_rejected(&self, error: &ApiError) {
        let mut state = self.write();
        *state = AuthState::cleared(false, Some(error.message.clone()));
    }

    /// Log in.
    ///
    /// Fulfilled: authenticated, user and token stored in state and
    /// persisted, welcome notification. Rejected: fail-closed - any prior
    /// session state is cleared.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn login(&self, request: LoginRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.login(&request).await {
            Ok(response) => {
                let first_name = response.user.first_name.clone();
                self.settle_session(response.token, response.user);
                self.notifier
                    .success(&format!("Welcome back, {first_name}!"));
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Register a new account; on success the new session is active.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn register(&self, request: RegisterRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.register(&request).await {
            Ok(response) => {
                self.settle_session(response.token, response.user);
                self.notifier
                    .success("Registration successful! Welcome to our platform.");
                Ok(())
            }
            Err(error) => {
                self.settle_rejected(&error);
                Err(error)
            }
        }
    }

    /// Log out.
    ///
    /// Client-side teardown is unconditional: local state and the
    /// persisted token/user are cleared whether or not the backend call
    /// succeeds. Only the remote invalidation is best-effort.
    pub async fn logout(&self) {
        self.write().loading = true;

        let result = self.client.logout().await;

        self.storage.remove(keys::TOKEN);
        self.storage.remove(keys::USER);
        *self.write() = AuthState::cleared(false, None);

        match result {
            Ok(()) => self.notifier.info("You have been logged out."),
            Err(error) => {
                tracing::warn!(%error, "Backend logout failed; session cleared locally");
            }
        }
    }

    /// Fetch the current profile and replace the stored user.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn fetch_profile(&self) -> Result<(), ApiError> {
        self.begin();
        match self.client.profile().await {
            Ok(user) => {
                storage::set_json(self.storage.as_ref(), keys::USER, &user);
                let mut state = self.write();
                state.user = Some(user);
                state.loading = false;
                state.error = None;
                Ok(())
            }
            Err(error) => {
                let mut state = self.write();
                state.loading = false;
                state.error = Some(error.message.clone());
                drop(state);
                Err(error)
            }
        }
    }

    /// Update the profile and replace the stored user.
    ///
    /// # Errors
    ///
    /// Returns the normalized error; the state already reflects it.
    pub async fn update_profile(&self, request: UpdateProfileRequest) -> Result<(), ApiError> {
        self.begin();
        match self.client.update_profile(&request).await {
            Ok(user) => {
                storage::set_json(self.storage.as_ref(), keys::USER, &user);
                let mut state = self.write();
                state.user = Some(user);
                state.loading = false;
                state.error = None;
                drop(state);
                self.notifier.success("Profile updated successfully!");
                Ok(())
            }
            Err(error) => {
                let mut state = self.write();
                state.loading = false;
                state.error = Some(error.message.clone());
                drop(state);
                Err(error)
            }
        }
    }
}
