//! Client route definitions

use axum::{routing::get, Router};

use crate::handlers::clients::*;
use crate::state::AppState;

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(get_clients).post(create_client))
        .route(
            "/clients/:id",
            get(show_client).patch(update_client).delete(delete_client),
        )
}
