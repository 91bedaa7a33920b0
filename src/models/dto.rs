//! Request/response DTOs for clients, loans and loan collections
//!
//! DTOs are camelCase on the wire. Incoming payloads are checked with
//! [`Validate::validate`] before they reach the service layer.

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{Client, Loan, LoanCollection, LoanStatus};

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "not_blank")]
    pub address: String,
}

impl From<Client> for ClientDto {
    fn from(client: Client) -> Self {
        Self {
            id: Some(client.id),
            name: client.name,
            email: client.email,
            address: client.address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoanDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub amount: i32,
    /// Ignored on create; new loans always start `Pending`
    #[serde(default)]
    pub status: LoanStatus,
    pub client_id: Uuid,
}

impl From<Loan> for LoanDto {
    fn from(loan: Loan) -> Self {
        Self {
            id: Some(loan.id),
            amount: loan.amount,
            status: loan.status,
            client_id: loan.client_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoanCollectionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub loan_id: Uuid,
    #[validate(range(min = 1))]
    pub amount: i32,
    /// Defaults to the time of creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}

impl From<LoanCollection> for LoanCollectionDto {
    fn from(collection: LoanCollection) -> Self {
        Self {
            id: Some(collection.id),
            loan_id: collection.loan_id,
            amount: collection.amount,
            collected_at: Some(collection.collected_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Nairobi").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_client_dto_validation() {
        let valid = ClientDto {
            id: None,
            name: "Jane Wanjiku".to_string(),
            email: "jane@example.com".to_string(),
            address: "12 Moi Avenue".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = ClientDto {
            email: "not-an-email".to_string(),
            name: " ".to_string(),
            ..valid
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_loan_collection_dto_is_camel_case() {
        let dto: LoanCollectionDto = serde_json::from_value(serde_json::json!({
            "loanId": "7b0f6c1e-1f7e-4d1c-9a59-0f1f7f5f6a10",
            "amount": 250
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.collected_at.is_none());

        let zero = LoanCollectionDto { amount: 0, ..dto };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_loan_dto_status_defaults_to_pending() {
        let dto: LoanDto = serde_json::from_value(serde_json::json!({
            "amount": 5000,
            "clientId": "7b0f6c1e-1f7e-4d1c-9a59-0f1f7f5f6a10"
        }))
        .unwrap();
        assert_eq!(dto.status, LoanStatus::Pending);
    }
}
