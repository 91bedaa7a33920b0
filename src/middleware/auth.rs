//! Authentication middleware
//!
//! [`token_filter`] runs in front of every protected route. It resolves the
//! bearer token to an [`AuthenticatedUser`] and stores it in the request
//! extensions; requests without a valid token are answered by
//! [`authentication_entry_point`] and never reach a handler.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthError, AuthService, JwtError};
use crate::error::ApiError;
use crate::models::UserRole;

/// Principal attached to an authenticated request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub jti: String,
}

#[derive(Debug, Serialize)]
struct AuthErrorBody {
    error: AuthErrorDetails,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetails {
    code: String,
    message: String,
}

/// 401 response for requests that failed authentication
pub fn authentication_entry_point(code: &str, message: &str) -> Response {
    let body = AuthErrorBody {
        error: AuthErrorDetails {
            code: code.to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Bearer token filter for protected routes
pub async fn token_filter(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        tracing::debug!(path = %request.uri().path(), "Request without bearer token");
        return authentication_entry_point(
            "MISSING_TOKEN",
            "Authorization header with Bearer token required",
        );
    };

    let (claims, user) = match auth_service.authenticate(bearer.token()).await {
        Ok(resolved) => resolved,
        Err(AuthError::Token(JwtError::TokenExpired)) => {
            return authentication_entry_point("TOKEN_EXPIRED", "Token has expired");
        }
        Err(AuthError::UserNotFound) => {
            return authentication_entry_point("INVALID_TOKEN", "Token subject no longer exists");
        }
        Err(AuthError::Token(e)) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return authentication_entry_point("INVALID_TOKEN", "Invalid token");
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        jti: claims.jti,
    });

    next.run(request).await
}

/// Extractor for the principal set by [`token_filter`]
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                authentication_entry_point("UNAUTHENTICATED", "Authentication required")
            })
    }
}

/// Extractor that additionally requires the admin role
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            tracing::info!(username = %user.username, "Admin access denied");
            return Err(ApiError::Forbidden("Admin access required".to_string()).into_response());
        }

        Ok(AdminUser(user))
    }
}
