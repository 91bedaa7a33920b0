//! User management handlers

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::{AdminUser, AuthenticatedUser, ValidatedJson};
use crate::auth::AuthService;
use crate::error::ApiError;
use crate::models::{CreateUserRequest, UserResponse};

/// POST /users - Register a user (admin only)
pub async fn create_user(
    State(auth_service): State<Arc<AuthService>>,
    AdminUser(admin): AdminUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = auth_service.create_user(req).await?;
    tracing::info!(created_by = %admin.username, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users - List users (admin only)
pub async fn list_users(
    State(auth_service): State<Arc<AuthService>>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = auth_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/me - The authenticated principal
pub async fn get_current_user(
    State(auth_service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = auth_service.find_user(user.user_id).await?;
    Ok(Json(user.into()))
}
