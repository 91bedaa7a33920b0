//! Authentication service
//!
//! Credential checks, token issuance, token resolution for the request
//! filter, and API user management.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AdminBootstrap;
use crate::error::ApiError;
use crate::models::{AccessTokenResponse, CreateUserRequest, User, UserRole};
use crate::repository::{RepositoryError, UserRepository};

use super::jwt::{generate_access_token, verify_token, Claims, JwtError};
use super::password::{hash_password, verify_password, PasswordError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User no longer exists")]
    UserNotFound,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::UserNotFound => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Token(JwtError::TokenExpired) => {
                ApiError::Unauthorized("Token has expired".to_string())
            }
            AuthError::Token(JwtError::EncodingFailed(msg)) => ApiError::InternalError(msg),
            AuthError::Token(_) => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::Conflict(msg) => ApiError::Conflict(msg),
            AuthError::Repository(e) => e.into(),
            AuthError::Password(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            jwt_secret,
            access_token_ttl_seconds,
            bcrypt_cost,
        }
    }

    /// Exchange credentials for an access token.
    ///
    /// `identifier` is matched against username or email. Unknown users and
    /// wrong passwords produce the same error.
    pub async fn issue_access_token(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<AccessTokenResponse, AuthError> {
        let user = self
            .users
            .find_by_username_or_email(identifier.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            tracing::info!(username = %user.username, "Rejected access token request");
            return Err(AuthError::InvalidCredentials);
        }

        let jti = Uuid::new_v4().to_string();
        let access_token =
            generate_access_token(&user, &jti, &self.jwt_secret, self.access_token_ttl_seconds)?;

        tracing::info!(username = %user.username, jti = %jti, "Issued access token");

        Ok(AccessTokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
        })
    }

    /// Resolve a bearer token to its claims and the stored user it names
    pub async fn authenticate(&self, token: &str) -> Result<(Claims, User), AuthError> {
        let claims = verify_token(token, &self.jwt_secret)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| JwtError::InvalidToken("Subject is not a user id".to_string()))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok((claims, user))
    }

    /// Register a new API user with a bcrypt-hashed password
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, AuthError> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        // Usernames and emails share one login namespace
        if self.users.find_by_username_or_email(&username).await?.is_some() {
            return Err(AuthError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        if self.users.find_by_username_or_email(&email).await?.is_some() {
            return Err(AuthError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash: hash_password(&request.password, self.bcrypt_cost).await?,
            role: request.role,
            created_at: Utc::now(),
        };

        let saved = self.users.save(&user).await?;
        tracing::info!(username = %saved.username, role = saved.role.as_str(), "Created user");

        Ok(saved)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.users.find_all().await?)
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Create the configured administrator unless that username already exists
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> Result<Option<User>, AuthError> {
        if self.users.find_by_username(&admin.username).await?.is_some() {
            tracing::debug!(username = %admin.username, "Bootstrap admin already present");
            return Ok(None);
        }

        let user = self
            .create_user(CreateUserRequest {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: UserRole::Admin,
            })
            .await?;

        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    fn service() -> AuthService {
        AuthService::new(Arc::new(InMemoryStore::new()), "test-secret".to_string(), 900, 4)
    }

    fn request(username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
            role: UserRole::Officer,
        }
    }

    #[tokio::test]
    async fn test_issue_token_by_username_and_email() {
        let service = service();
        service
            .create_user(request("omondi", "omondi@example.com"))
            .await
            .unwrap();

        let by_username = service.issue_access_token("omondi", "password123").await.unwrap();
        assert_eq!(by_username.token_type, "Bearer");
        assert_eq!(by_username.expires_in, 900);

        let by_email = service
            .issue_access_token("omondi@example.com", "password123")
            .await
            .unwrap();
        let (claims, user) = service.authenticate(&by_email.access_token).await.unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(user.username, "omondi");
        assert_eq!(user.email, "omondi@example.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let service = service();
        service
            .create_user(request("omondi", "omondi@example.com"))
            .await
            .unwrap();

        let wrong = service.issue_access_token("omondi", "nope").await.unwrap_err();
        let unknown = service.issue_access_token("ghost", "nope").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let service = service();
        service
            .create_user(request("omondi", "omondi@example.com"))
            .await
            .unwrap();

        let same_name = service
            .create_user(request("omondi", "other@example.com"))
            .await
            .unwrap_err();
        let same_email = service
            .create_user(request("other", "omondi@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(same_name, AuthError::Conflict(_)));
        assert!(matches!(same_email, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let service = service();
        let admin = AdminBootstrap {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin-password".to_string(),
        };

        let created = service.ensure_admin(&admin).await.unwrap();
        assert_eq!(created.map(|u| u.role), Some(UserRole::Admin));
        assert!(service.ensure_admin(&admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_is_rejected() {
        let issuing = service();
        let user = issuing
            .create_user(request("omondi", "omondi@example.com"))
            .await
            .unwrap();
        let token = generate_access_token(&user, "jti", "test-secret", 900).unwrap();

        // Same secret, empty store
        let err = service().authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_username_cannot_shadow_another_users_email() {
        let service = service();
        service
            .create_user(CreateUserRequest {
                role: UserRole::Admin,
                ..request("admin", "boss@example.com")
            })
            .await
            .unwrap();

        let shadow_name = service
            .create_user(request("boss@example.com", "officer@example.com"))
            .await
            .unwrap_err();
        let shadow_email = service
            .create_user(request("officer", "admin"))
            .await
            .unwrap_err();
        assert!(matches!(shadow_name, AuthError::Conflict(_)));
        assert!(matches!(shadow_email, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_resolves_to_its_own_user() {
        let store = Arc::new(InMemoryStore::new());
        let service = AuthService::new(store.clone(), "test-secret".to_string(), 900, 4);
        let admin = service
            .create_user(CreateUserRequest {
                role: UserRole::Admin,
                ..request("admin", "boss@example.com")
            })
            .await
            .unwrap();

        // Written straight to the store, bypassing the service checks
        let officer = User {
            id: Uuid::new_v4(),
            username: "boss@example.com".to_string(),
            email: "officer@example.com".to_string(),
            password_hash: hash_password("password123", 4).await.unwrap(),
            role: UserRole::Officer,
            created_at: Utc::now(),
        };
        UserRepository::save(store.as_ref(), &officer).await.unwrap();

        let token = generate_access_token(&officer, "jti", "test-secret", 900).unwrap();
        let (_, resolved) = service.authenticate(&token).await.unwrap();
        assert_eq!(resolved.id, officer.id);
        assert_eq!(resolved.role, UserRole::Officer);

        let issued = service
            .issue_access_token("boss@example.com", "password123")
            .await
            .unwrap();
        let (_, by_login) = service.authenticate(&issued.access_token).await.unwrap();
        assert_eq!(by_login.id, officer.id);
        assert_ne!(by_login.id, admin.id);
    }
}
