//! Loan collection route definitions

use axum::{routing::get, Router};

use crate::handlers::loan_collections::*;
use crate::state::AppState;

pub fn loan_collection_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/loans/collections/:loanId/count",
            get(count_loan_collections),
        )
        .route(
            "/loan/collections",
            get(get_loan_collections).post(create_loan_collection),
        )
        .route(
            "/loan/collections/:id",
            get(show_loan_collection)
                .patch(update_loan_collection)
                .delete(delete_loan_collection),
        )
}
