//! `market-cli auth` handlers.

use marketfront_core::{ApiError, LoginRequest, RegisterRequest, UpdateProfileRequest};
use marketfront_store::AppStore;

use super::print_json;

pub async fn login(store: &AppStore, email: String, password: String) -> Result<(), ApiError> {
    store.auth().login(LoginRequest { email, password }).await?;
    print_json(&store.auth().state());
    Ok(())
}

pub async fn register(
    store: &AppStore,
    email: String,
    username: String,
    password: String,
    first_name: String,
    last_name: String,
) -> Result<(), ApiError> {
    store
        .auth()
        .register(RegisterRequest {
            email,
            username,
            password,
            first_name,
            last_name,
        })
        .await?;
    print_json(&store.auth().state());
    Ok(())
}

pub async fn logout(store: &AppStore) {
    store.auth().logout().await;
}

/// Fetch the profile from the backend and print it.
pub async fn whoami(store: &AppStore) -> Result<(), ApiError> {
    store.auth().fetch_profile().await?;
    print_json(&store.auth().state().user);
    Ok(())
}

pub async fn update(
    store: &AppStore,
    email: Option<String>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<(), ApiError> {
    let request = UpdateProfileRequest {
        email,
        username,
        first_name,
        last_name,
    };
    if request.is_empty() {
        tracing::warn!("No profile fields given; nothing to update");
        return Ok(());
    }
    store.auth().update_profile(request).await?;
    print_json(&store.auth().state().user);
    Ok(())
}
