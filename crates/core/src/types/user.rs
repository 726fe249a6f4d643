//! User identity and authentication types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A registered user of the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this user holds an administrative role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// User role.
///
/// The backend historically emitted Spring-style `ROLE_`-prefixed values;
/// both spellings remain accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    RoleUser,
    RoleAdmin,
}

impl UserRole {
    /// Whether this role grants administrative access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::RoleAdmin)
    }
}

/// Credentials submitted to `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// New-account payload submitted to `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Successful login/register response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Partial profile update submitted to `PUT /users/profile`.
///
/// Absent fields are omitted from the request body and left untouched by
/// the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UpdateProfileRequest {
    /// Whether the request carries no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            email: "a@b.com".to_string(),
            username: "ab".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Baker".to_string(),
            role: UserRole::User,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_user_wire_names_are_camel_case() {
        let json = serde_json::to_value(sample_user()).expect("serialize");
        assert_eq!(json["firstName"], "Alice");
        assert_eq!(json["lastName"], "Baker");
        assert_eq!(json["role"], "USER");
        // Optional timestamps are omitted, not null
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_role_legacy_spellings() {
        let role: UserRole = serde_json::from_str("\"ROLE_ADMIN\"").expect("deserialize");
        assert_eq!(role, UserRole::RoleAdmin);
        assert!(role.is_admin());

        let role: UserRole = serde_json::from_str("\"ROLE_USER\"").expect("deserialize");
        assert_eq!(role, UserRole::RoleUser);
        assert!(!role.is_admin());
    }

    #[test]
    fn test_is_admin() {
        let mut user = sample_user();
        assert!(!user.is_admin());
        user.role = UserRole::Admin;
        assert!(user.is_admin());
    }

    #[test]
    fn test_profile_update_skips_absent_fields() {
        let request = UpdateProfileRequest {
            username: Some("new-name".to_string()),
            ..UpdateProfileRequest::default()
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert_eq!(json, "{\"username\":\"new-name\"}");
        assert!(!request.is_empty());
        assert!(UpdateProfileRequest::default().is_empty());
    }
}
