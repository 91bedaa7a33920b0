//! Loan handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use std::sync::Arc;

use super::ValidatedJson;
use crate::error::ApiError;
use crate::models::{LoanCollectionDto, LoanDto};
use crate::services::{ControllerService, FieldMap};

pub async fn get_loans(State(service): State<Arc<ControllerService>>) -> Result<Response, ApiError> {
    let loans: Vec<LoanDto> = service
        .get_loans()
        .await?
        .into_iter()
        .map(LoanDto::from)
        .collect();

    Ok(ControllerService::response(StatusCode::OK, loans))
}

pub async fn show_loan(
    State(service): State<Arc<ControllerService>>,
    Path(loan_id): Path<String>,
) -> Result<Response, ApiError> {
    let loan = service.show_loan(&loan_id).await?;
    Ok(ControllerService::response(StatusCode::OK, LoanDto::from(loan)))
}

pub async fn create_loan(
    State(service): State<Arc<ControllerService>>,
    ValidatedJson(dto): ValidatedJson<LoanDto>,
) -> Result<Response, ApiError> {
    let loan = service.create_loan(dto).await?;
    Ok(ControllerService::response(
        StatusCode::CREATED,
        LoanDto::from(loan),
    ))
}

pub async fn update_loan(
    State(service): State<Arc<ControllerService>>,
    Path(loan_id): Path<String>,
    payload: Result<Json<FieldMap>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let loan = service.update_loan(&loan_id, payload).await?;
    Ok(ControllerService::response(StatusCode::OK, LoanDto::from(loan)))
}

pub async fn delete_loan(
    State(service): State<Arc<ControllerService>>,
    Path(loan_id): Path<String>,
) -> Result<Response, ApiError> {
    service.delete_loan(&loan_id).await?;
    Ok(ControllerService::response(StatusCode::NO_CONTENT, ()))
}

/// GET /loans/:id/collections
pub async fn get_loan_collections_for_loan(
    State(service): State<Arc<ControllerService>>,
    Path(loan_id): Path<String>,
) -> Result<Response, ApiError> {
    let collections: Vec<LoanCollectionDto> = service
        .get_collections_for_loan(&loan_id)
        .await?
        .into_iter()
        .map(LoanCollectionDto::from)
        .collect();

    Ok(ControllerService::response(StatusCode::OK, collections))
}
