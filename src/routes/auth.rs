//! Public routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;

/// Routes reachable without a bearer token
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::index))
        .route(
            "/entryventures/api/v1/auth/access-token",
            post(auth::access_token),
        )
}
