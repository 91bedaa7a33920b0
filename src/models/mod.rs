//! Data models for the EntryVentures backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod auth;
pub mod dto;

pub use auth::*;
pub use dto::*;

/// Client model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
}

/// Loan model. `client_id` is fixed at creation.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq, Eq)]
pub struct Loan {
    pub id: Uuid,
    pub amount: i32,
    pub status: LoanStatus,
    pub client_id: Uuid,
}

/// Loan status enum
#[derive(Debug, Default, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "loan_status")]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Disbursed,
    Repaid,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 5] = [
        LoanStatus::Pending,
        LoanStatus::Approved,
        LoanStatus::Rejected,
        LoanStatus::Disbursed,
        LoanStatus::Repaid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::Approved => "Approved",
            LoanStatus::Rejected => "Rejected",
            LoanStatus::Disbursed => "Disbursed",
            LoanStatus::Repaid => "Repaid",
        }
    }

    /// Case-insensitive lookup by name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// A repayment collected against a loan
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq, Eq)]
pub struct LoanCollection {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount: i32,
    pub collected_at: DateTime<Utc>,
}

/// API user model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// User roles
#[derive(Debug, Default, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Officer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Officer => "officer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_status_defaults_to_pending() {
        assert_eq!(LoanStatus::default(), LoanStatus::Pending);
    }

    #[test]
    fn test_loan_status_parse() {
        assert_eq!(LoanStatus::parse("Approved"), Some(LoanStatus::Approved));
        assert_eq!(LoanStatus::parse(" repaid "), Some(LoanStatus::Repaid));
        assert_eq!(LoanStatus::parse("Cancelled"), None);
    }

    #[test]
    fn test_loan_status_serializes_by_name() {
        let json = serde_json::to_string(&LoanStatus::Disbursed).unwrap();
        assert_eq!(json, "\"Disbursed\"");
    }

    #[test]
    fn test_user_role_wire_names() {
        assert_eq!(serde_json::to_string(&UserRole::Officer).unwrap(), "\"officer\"");
        let admin: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(admin.as_str(), "admin");
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn test_user_password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: UserRole::Officer,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
