//! User route definitions

use axum::{routing::get, Router};

use crate::handlers::users::{create_user, get_current_user, list_users};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_current_user))
}
