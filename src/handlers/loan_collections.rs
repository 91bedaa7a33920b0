//! Loan collection handlers
//!
//! Thin adapters: each one extracts the request, calls a single
//! [`ControllerService`] operation and maps the result to a DTO.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use std::sync::Arc;

use super::ValidatedJson;
use crate::error::ApiError;
use crate::models::LoanCollectionDto;
use crate::services::{ControllerService, FieldMap};

/// GET /loans/collections/:loanId/count
pub async fn count_loan_collections(
    State(service): State<Arc<ControllerService>>,
    Path(loan_id): Path<String>,
) -> Result<Response, ApiError> {
    let count = service.count_loan_collections_by_loan_id(&loan_id).await?;
    Ok(ControllerService::response(StatusCode::OK, count))
}

/// GET /loan/collections
pub async fn get_loan_collections(
    State(service): State<Arc<ControllerService>>,
) -> Result<Response, ApiError> {
    let collections: Vec<LoanCollectionDto> = service
        .get_loan_collections()
        .await?
        .into_iter()
        .map(LoanCollectionDto::from)
        .collect();

    Ok(ControllerService::response(StatusCode::OK, collections))
}

/// GET /loan/collections/:id
pub async fn show_loan_collection(
    State(service): State<Arc<ControllerService>>,
    Path(loan_collection_id): Path<String>,
) -> Result<Response, ApiError> {
    let collection = service.show_loan_collection(&loan_collection_id).await?;
    Ok(ControllerService::response(
        StatusCode::OK,
        LoanCollectionDto::from(collection),
    ))
}

/// POST /loan/collections
pub async fn create_loan_collection(
    State(service): State<Arc<ControllerService>>,
    ValidatedJson(dto): ValidatedJson<LoanCollectionDto>,
) -> Result<Response, ApiError> {
    let collection = service.create_loan_collection(dto).await?;
    Ok(ControllerService::response(
        StatusCode::CREATED,
        LoanCollectionDto::from(collection),
    ))
}

/// PATCH /loan/collections/:id
pub async fn update_loan_collection(
    State(service): State<Arc<ControllerService>>,
    Path(loan_collection_id): Path<String>,
    payload: Result<Json<FieldMap>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let collection = service
        .update_loan_collection(&loan_collection_id, payload)
        .await?;
    Ok(ControllerService::response(
        StatusCode::OK,
        LoanCollectionDto::from(collection),
    ))
}

/// DELETE /loan/collections/:id
///
/// Any request body is ignored.
pub async fn delete_loan_collection(
    State(service): State<Arc<ControllerService>>,
    Path(loan_collection_id): Path<String>,
) -> Result<Response, ApiError> {
    service.delete_loan_collection(&loan_collection_id).await?;
    Ok(ControllerService::response(StatusCode::NO_CONTENT, ()))
}
