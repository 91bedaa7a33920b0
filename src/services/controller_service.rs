//! Controller service
//!
//! Sits between the HTTP handlers and the repositories: resolves ids, builds
//! entities from DTOs (looking up the referenced parent first), applies
//! partial updates and wraps results in status-coded responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    not_blank, Client, ClientDto, Loan, LoanCollection, LoanCollectionDto, LoanDto, LoanStatus,
};
use crate::repository::{ClientRepository, LoanCollectionRepository, LoanRepository};

/// Partial update payload: field name to new value
pub type FieldMap = HashMap<String, String>;

#[derive(Clone)]
pub struct ControllerService {
    clients: Arc<dyn ClientRepository>,
    loans: Arc<dyn LoanRepository>,
    collections: Arc<dyn LoanCollectionRepository>,
}

impl ControllerService {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        loans: Arc<dyn LoanRepository>,
        collections: Arc<dyn LoanCollectionRepository>,
    ) -> Self {
        Self {
            clients,
            loans,
            collections,
        }
    }

    /// Build the HTTP response for a handler result. `204` carries no body.
    pub fn response<T: Serialize>(status: StatusCode, body: T) -> Response {
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        (status, Json(body)).into_response()
    }

    // ---- clients ------------------------------------------------------------

    pub async fn get_clients(&self) -> ApiResult<Vec<Client>> {
        Ok(self.clients.find_all().await?)
    }

    pub async fn show_client(&self, client_id: &str) -> ApiResult<Client> {
        let id = parse_id(client_id, "Client")?;
        self.find_client(id).await
    }

    pub async fn create_client(&self, dto: ClientDto) -> ApiResult<Client> {
        let email = dto.email.trim().to_string();
        if self.clients.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "A client with email '{}' already exists",
                email
            )));
        }

        let client = Client {
            id: Uuid::new_v4(),
            name: dto.name.trim().to_string(),
            email,
            address: dto.address.trim().to_string(),
        };

        let saved = self.clients.save(&client).await?;
        tracing::info!(client_id = %saved.id, "Created client");
        Ok(saved)
    }

    pub async fn update_client(&self, client_id: &str, payload: FieldMap) -> ApiResult<Client> {
        let id = parse_id(client_id, "Client")?;
        let mut client = self.find_client(id).await?;

        for (field, value) in payload {
            match field.as_str() {
                "name" => client.name = required_text(&field, &value)?,
                "address" => client.address = required_text(&field, &value)?,
                "email" => {
                    let email = value.trim().to_string();
                    if !validator::validate_email(&email) {
                        return Err(ApiError::ValidationError(format!(
                            "email: '{}' is not a valid email address",
                            email
                        )));
                    }
                    client.email = email;
                }
                _ => return Err(unknown_field(&field, "client")),
            }
        }

        if let Some(other) = self.clients.find_by_email(&client.email).await? {
            if other.id != client.id {
                return Err(ApiError::Conflict(format!(
                    "A client with email '{}' already exists",
                    client.email
                )));
            }
        }

        self.clients
            .update(&client)
            .await?
            .ok_or_else(|| not_found("Client", client_id))
    }

    pub async fn delete_client(&self, client_id: &str) -> ApiResult<()> {
        let id = parse_id(client_id, "Client")?;
        if !self.clients.delete(id).await? {
            return Err(not_found("Client", client_id));
        }
        tracing::info!(client_id = %id, "Deleted client");
        Ok(())
    }

    // ---- loans --------------------------------------------------------------

    pub async fn get_loans(&self) -> ApiResult<Vec<Loan>> {
        Ok(self.loans.find_all().await?)
    }

    pub async fn show_loan(&self, loan_id: &str) -> ApiResult<Loan> {
        let id = parse_id(loan_id, "Loan")?;
        self.find_loan(id).await
    }

    /// New loans start `Pending` whatever status the DTO carries
    pub async fn create_loan(&self, dto: LoanDto) -> ApiResult<Loan> {
        let client = self.find_client(dto.client_id).await?;

        if self.loans.find_by_client_id(client.id).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "Client {} already has a loan",
                client.id
            )));
        }

        let loan = Loan {
            id: Uuid::new_v4(),
            amount: dto.amount,
            status: LoanStatus::Pending,
            client_id: client.id,
        };

        let saved = self.loans.save(&loan).await?;
        tracing::info!(loan_id = %saved.id, client_id = %client.id, "Created loan");
        Ok(saved)
    }

    pub async fn update_loan(&self, loan_id: &str, payload: FieldMap) -> ApiResult<Loan> {
        let id = parse_id(loan_id, "Loan")?;
        let mut loan = self.find_loan(id).await?;

        for (field, value) in payload {
            match field.as_str() {
                "amount" => loan.amount = parse_amount(&field, &value, 0)?,
                "status" => {
                    loan.status = LoanStatus::parse(&value).ok_or_else(|| {
                        ApiError::ValidationError(format!(
                            "status: '{}' is not a loan status",
                            value
                        ))
                    })?
                }
                "clientId" => {
                    return Err(ApiError::BadRequest(
                        "clientId cannot be changed once a loan exists".to_string(),
                    ))
                }
                _ => return Err(unknown_field(&field, "loan")),
            }
        }

        self.loans
            .update(&loan)
            .await?
            .ok_or_else(|| not_found("Loan", loan_id))
    }

    pub async fn delete_loan(&self, loan_id: &str) -> ApiResult<()> {
        let id = parse_id(loan_id, "Loan")?;
        if !self.loans.delete(id).await? {
            return Err(not_found("Loan", loan_id));
        }
        tracing::info!(loan_id = %id, "Deleted loan");
        Ok(())
    }

    /// Collections recorded against one loan; the loan must exist
    pub async fn get_collections_for_loan(&self, loan_id: &str) -> ApiResult<Vec<LoanCollection>> {
        let id = parse_id(loan_id, "Loan")?;
        let loan = self.find_loan(id).await?;
        Ok(self.collections.find_by_loan_id(loan.id).await?)
    }

    // ---- loan collections ---------------------------------------------------

    /// Number of collections recorded for `loan_id`. Zero for an unknown loan.
    pub async fn count_loan_collections_by_loan_id(&self, loan_id: &str) -> ApiResult<i64> {
        match Uuid::parse_str(loan_id) {
            Ok(id) => Ok(self.collections.count_by_loan_id(id).await?),
            Err(_) => Ok(0),
        }
    }

    pub async fn get_loan_collections(&self) -> ApiResult<Vec<LoanCollection>> {
        Ok(self.collections.find_all().await?)
    }

    pub async fn show_loan_collection(&self, loan_collection_id: &str) -> ApiResult<LoanCollection> {
        let id = parse_id(loan_collection_id, "Loan collection")?;
        self.find_loan_collection(id).await
    }

    pub async fn create_loan_collection(&self, dto: LoanCollectionDto) -> ApiResult<LoanCollection> {
        let loan = self.find_loan(dto.loan_id).await?;

        let collection = LoanCollection {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            amount: dto.amount,
            collected_at: dto.collected_at.unwrap_or_else(Utc::now),
        };

        let saved = self.collections.save(&collection).await?;
        tracing::info!(
            loan_collection_id = %saved.id,
            loan_id = %loan.id,
            amount = saved.amount,
            "Recorded loan collection"
        );
        Ok(saved)
    }

    pub async fn update_loan_collection(
        &self,
        loan_collection_id: &str,
        payload: FieldMap,
    ) -> ApiResult<LoanCollection> {
        let id = parse_id(loan_collection_id, "Loan collection")?;
        let mut collection = self.find_loan_collection(id).await?;

        for (field, value) in payload {
            match field.as_str() {
                "amount" => collection.amount = parse_amount(&field, &value, 1)?,
                "collectedAt" => {
                    collection.collected_at = DateTime::parse_from_rfc3339(value.trim())
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|_| {
                            ApiError::ValidationError(format!(
                                "collectedAt: '{}' is not an RFC 3339 timestamp",
                                value
                            ))
                        })?
                }
                "loanId" => {
                    let loan_id = Uuid::parse_str(value.trim()).map_err(|_| {
                        ApiError::ValidationError(format!("loanId: '{}' is not a UUID", value))
                    })?;
                    collection.loan_id = self.find_loan(loan_id).await?.id;
                }
                _ => return Err(unknown_field(&field, "loan collection")),
            }
        }

        self.collections
            .update(&collection)
            .await?
            .ok_or_else(|| not_found("Loan collection", loan_collection_id))
    }

    pub async fn delete_loan_collection(&self, loan_collection_id: &str) -> ApiResult<()> {
        let id = parse_id(loan_collection_id, "Loan collection")?;
        if !self.collections.delete(id).await? {
            return Err(not_found("Loan collection", loan_collection_id));
        }
        tracing::info!(loan_collection_id = %id, "Deleted loan collection");
        Ok(())
    }

    // ---- lookups ------------------------------------------------------------

    async fn find_client(&self, id: Uuid) -> ApiResult<Client> {
        self.clients
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("Client", &id.to_string()))
    }

    async fn find_loan(&self, id: Uuid) -> ApiResult<Loan> {
        self.loans
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("Loan", &id.to_string()))
    }

    async fn find_loan_collection(&self, id: Uuid) -> ApiResult<LoanCollection> {
        self.collections
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found("Loan collection", &id.to_string()))
    }
}

fn not_found(entity: &str, id: &str) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", entity, id))
}

/// A path id that is not a UUID cannot name a stored row
fn parse_id(raw: &str, entity: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| not_found(entity, raw))
}

fn unknown_field(field: &str, entity: &str) -> ApiError {
    ApiError::BadRequest(format!("'{}' is not an updatable {} field", field, entity))
}

fn required_text(field: &str, value: &str) -> ApiResult<String> {
    not_blank(value)
        .map_err(|_| ApiError::ValidationError(format!("{}: must not be blank", field)))?;
    Ok(value.trim().to_string())
}

fn parse_amount(field: &str, value: &str, min: i32) -> ApiResult<i32> {
    match value.trim().parse::<i32>() {
        Ok(amount) if amount >= min => Ok(amount),
        Ok(_) => Err(ApiError::ValidationError(format!(
            "{}: must be at least {}",
            field, min
        ))),
        Err(_) => Err(ApiError::ValidationError(format!(
            "{}: '{}' is not an integer",
            field, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    fn service() -> ControllerService {
        let store = Arc::new(InMemoryStore::new());
        ControllerService::new(store.clone(), store.clone(), store)
    }

    fn client_dto(email: &str) -> ClientDto {
        ClientDto {
            id: None,
            name: "Fatuma Hassan".to_string(),
            email: email.to_string(),
            address: "Mombasa Road".to_string(),
        }
    }

    async fn seeded_loan(service: &ControllerService) -> Loan {
        let client = service
            .create_client(client_dto("fatuma@example.com"))
            .await
            .unwrap();
        service
            .create_loan(LoanDto {
                id: None,
                amount: 20_000,
                status: LoanStatus::Approved,
                client_id: client.id,
            })
            .await
            .unwrap()
    }

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_duplicate_client_email_conflicts() {
        let service = service();
        service.create_client(client_dto("dup@example.com")).await.unwrap();
        let err = service
            .create_client(client_dto("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_new_loan_is_pending_regardless_of_dto() {
        let service = service();
        let loan = seeded_loan(&service).await;
        assert_eq!(loan.status, LoanStatus::Pending);
    }

    #[tokio::test]
    async fn test_loan_for_unknown_client_is_not_found() {
        let service = service();
        let err = service
            .create_loan(LoanDto {
                id: None,
                amount: 100,
                status: LoanStatus::Pending,
                client_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_loan_client_cannot_be_patched() {
        let service = service();
        let loan = seeded_loan(&service).await;
        let other = Uuid::new_v4().to_string();
        let err = service
            .update_loan(&loan.id.to_string(), fields(&[("clientId", &other)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_patch_only_touches_supplied_fields() {
        let service = service();
        let loan = seeded_loan(&service).await;
        let collection = service
            .create_loan_collection(LoanCollectionDto {
                id: None,
                loan_id: loan.id,
                amount: 1_500,
                collected_at: None,
            })
            .await
            .unwrap();

        let updated = service
            .update_loan_collection(&collection.id.to_string(), fields(&[("amount", "2500")]))
            .await
            .unwrap();
        assert_eq!(updated.amount, 2_500);
        assert_eq!(updated.loan_id, collection.loan_id);
        assert_eq!(updated.collected_at, collection.collected_at);

        let patched_loan = service
            .update_loan(&loan.id.to_string(), fields(&[("status", "Disbursed")]))
            .await
            .unwrap();
        assert_eq!(patched_loan.status, LoanStatus::Disbursed);
        assert_eq!(patched_loan.amount, loan.amount);
    }

    #[tokio::test]
    async fn test_patch_rejects_unknown_fields_and_bad_values() {
        let service = service();
        let loan = seeded_loan(&service).await;
        let id = loan.id.to_string();

        assert!(matches!(
            service.update_loan(&id, fields(&[("interest", "5")])).await,
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            service.update_loan(&id, fields(&[("amount", "lots")])).await,
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            service.update_loan(&id, fields(&[("status", "Vanished")])).await,
            Err(ApiError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_count_collections() {
        let service = service();
        let loan = seeded_loan(&service).await;
        let id = loan.id.to_string();
        assert_eq!(service.count_loan_collections_by_loan_id(&id).await.unwrap(), 0);

        for amount in [100, 200] {
            service
                .create_loan_collection(LoanCollectionDto {
                    id: None,
                    loan_id: loan.id,
                    amount,
                    collected_at: None,
                })
                .await
                .unwrap();
        }
        assert_eq!(service.count_loan_collections_by_loan_id(&id).await.unwrap(), 2);
        assert_eq!(
            service
                .count_loan_collections_by_loan_id("not-a-uuid")
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let service = service();
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(
            service.show_loan_collection(&missing).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.show_loan_collection("garbage").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_loan_collection(&missing).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service
                .update_loan_collection(&missing, fields(&[("amount", "5")]))
                .await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_client_email_patch_keeps_uniqueness() {
        let service = service();
        service.create_client(client_dto("first@example.com")).await.unwrap();
        let second = service.create_client(client_dto("second@example.com")).await.unwrap();

        let err = service
            .update_client(&second.id.to_string(), fields(&[("email", "first@example.com")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let same = service
            .update_client(&second.id.to_string(), fields(&[("email", "second@example.com")]))
            .await
            .unwrap();
        assert_eq!(same.email, "second@example.com");
    }

    #[test]
    fn test_no_content_response_has_no_body() {
        let response = ControllerService::response(StatusCode::NO_CONTENT, ());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get("content-type").is_none());
    }
}
