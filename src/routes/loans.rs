//! Loan route definitions

use axum::{routing::get, Router};

use crate::handlers::loans::*;
use crate::state::AppState;

pub fn loan_routes() -> Router<AppState> {
    Router::new()
        .route("/loans", get(get_loans).post(create_loan))
        .route(
            "/loans/:id",
            get(show_loan).patch(update_loan).delete(delete_loan),
        )
        .route("/loans/:id/collections", get(get_loan_collections_for_loan))
}
