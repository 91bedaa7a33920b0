//! Client handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use std::sync::Arc;

use super::ValidatedJson;
use crate::error::ApiError;
use crate::models::ClientDto;
use crate::services::{ControllerService, FieldMap};

pub async fn get_clients(
    State(service): State<Arc<ControllerService>>,
) -> Result<Response, ApiError> {
    let clients: Vec<ClientDto> = service
        .get_clients()
        .await?
        .into_iter()
        .map(ClientDto::from)
        .collect();

    Ok(ControllerService::response(StatusCode::OK, clients))
}

pub async fn show_client(
    State(service): State<Arc<ControllerService>>,
    Path(client_id): Path<String>,
) -> Result<Response, ApiError> {
    let client = service.show_client(&client_id).await?;
    Ok(ControllerService::response(
        StatusCode::OK,
        ClientDto::from(client),
    ))
}

pub async fn create_client(
    State(service): State<Arc<ControllerService>>,
    ValidatedJson(dto): ValidatedJson<ClientDto>,
) -> Result<Response, ApiError> {
    let client = service.create_client(dto).await?;
    Ok(ControllerService::response(
        StatusCode::CREATED,
        ClientDto::from(client),
    ))
}

pub async fn update_client(
    State(service): State<Arc<ControllerService>>,
    Path(client_id): Path<String>,
    payload: Result<Json<FieldMap>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let client = service.update_client(&client_id, payload).await?;
    Ok(ControllerService::response(
        StatusCode::OK,
        ClientDto::from(client),
    ))
}

pub async fn delete_client(
    State(service): State<Arc<ControllerService>>,
    Path(client_id): Path<String>,
) -> Result<Response, ApiError> {
    service.delete_client(&client_id).await?;
    Ok(ControllerService::response(StatusCode::NO_CONTENT, ()))
}
