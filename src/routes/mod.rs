//! Route definitions for the EntryVentures API

mod auth;
mod clients;
mod loan_collections;
mod loans;
mod users;

pub use auth::auth_routes;
pub use clients::client_routes;
pub use loan_collections::loan_collection_routes;
pub use loans::loan_routes;
pub use users::user_routes;

use axum::{middleware::from_fn, middleware::from_fn_with_state, Router};
use tower::ServiceBuilder;

use crate::error::ApiError;
use crate::middleware::{cors_layer, request_tracing, security_headers, token_filter};
use crate::state::AppState;

/// Assemble the full application router.
///
/// Everything except [`auth_routes`] sits behind the token filter, unknown
/// paths included. CORS is the outermost layer so preflight requests are
/// answered before authentication runs.
pub fn app(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let protected = Router::new()
        .merge(client_routes())
        .merge(loan_routes())
        .merge(loan_collection_routes())
        .merge(user_routes())
        .fallback(not_found)
        .layer(from_fn_with_state(state.auth_service.clone(), token_filter));

    Router::new()
        .merge(auth_routes())
        .merge(protected)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(cors_allowed_origins))
                .layer(from_fn(request_tracing))
                .layer(security_headers()),
        )
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No route matches this path".to_string())
}
