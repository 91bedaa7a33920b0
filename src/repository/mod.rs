//! Repository layer
//!
//! One trait per entity. [`postgres::PgStore`] backs the running server;
//! [`memory::InMemoryStore`] keeps the same key and foreign-key rules in
//! process and is what the HTTP tests run against.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Client, Loan, LoanCollection, User};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Errors raised by a backing store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Unique or foreign-key constraint violated
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict(format!(
                    "Duplicate value violates constraint {}",
                    constraint
                ));
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::Conflict(format!(
                    "Foreign key constraint {} violated",
                    constraint
                ));
            }
        }
        RepositoryError::Database(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Client>>;
    async fn find_all(&self) -> RepositoryResult<Vec<Client>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Client>>;
    async fn save(&self, client: &Client) -> RepositoryResult<Client>;
    /// Returns `None` when no row has the client's id
    async fn update(&self, client: &Client) -> RepositoryResult<Option<Client>>;
    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait LoanRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Loan>>;
    async fn find_all(&self) -> RepositoryResult<Vec<Loan>>;
    async fn find_by_client_id(&self, client_id: Uuid) -> RepositoryResult<Option<Loan>>;
    async fn save(&self, loan: &Loan) -> RepositoryResult<Loan>;
    async fn update(&self, loan: &Loan) -> RepositoryResult<Option<Loan>>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait LoanCollectionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanCollection>>;
    async fn find_all(&self) -> RepositoryResult<Vec<LoanCollection>>;
    async fn find_by_loan_id(&self, loan_id: Uuid) -> RepositoryResult<Vec<LoanCollection>>;
    async fn count_by_loan_id(&self, loan_id: Uuid) -> RepositoryResult<i64>;
    async fn save(&self, collection: &LoanCollection) -> RepositoryResult<LoanCollection>;
    async fn update(&self, collection: &LoanCollection)
        -> RepositoryResult<Option<LoanCollection>>;
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    /// Matches `identifier` against either unique column, preferring a username hit
    async fn find_by_username_or_email(&self, identifier: &str)
        -> RepositoryResult<Option<User>>;
    async fn find_all(&self) -> RepositoryResult<Vec<User>>;
    async fn save(&self, user: &User) -> RepositoryResult<User>;
}
