//! Authentication models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::dto::not_blank;
use super::{User, UserRole};

/// Credentials exchanged for an access token. `username` may also be an email.
#[derive(Debug, Deserialize, Validate)]
pub struct AccessTokenRequest {
    #[validate(custom = "not_blank")]
    pub username: String,
    #[validate(custom = "not_blank")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Request to register a new API user
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom = "not_blank", length(max = 255))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// User response (sanitized for API)
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
