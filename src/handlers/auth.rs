//! Authentication HTTP handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use super::ValidatedJson;
use crate::auth::AuthService;
use crate::error::ApiError;
use crate::models::{AccessTokenRequest, AccessTokenResponse};

/// GET / - Service banner, reachable without a token
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

/// POST /entryventures/api/v1/auth/access-token - Exchange credentials for a bearer token
pub async fn access_token(
    State(auth_service): State<Arc<AuthService>>,
    ValidatedJson(req): ValidatedJson<AccessTokenRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let token = auth_service
        .issue_access_token(&req.username, &req.password)
        .await?;

    Ok(Json(token))
}
