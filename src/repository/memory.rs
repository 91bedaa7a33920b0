//! In-process store with the same key rules as the SQL schema
//!
//! Unique columns, the loan → client and collection → loan foreign keys and
//! the one-loan-per-client rule are enforced here so tests observe the same
//! conflicts PostgreSQL would raise.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ClientRepository, LoanCollectionRepository, LoanRepository, RepositoryError,
    RepositoryResult, UserRepository,
};
use crate::models::{Client, Loan, LoanCollection, User};

#[derive(Default)]
struct Tables {
    clients: Vec<Client>,
    loans: Vec<Loan>,
    collections: Vec<LoanCollection>,
    users: Vec<User>,
}

impl Tables {
    fn client_exists(&self, id: Uuid) -> bool {
        self.clients.iter().any(|c| c.id == id)
    }

    fn loan_exists(&self, id: Uuid) -> bool {
        self.loans.iter().any(|l| l.id == id)
    }
}

fn conflict(message: &str) -> RepositoryError {
    RepositoryError::Conflict(message.to_string())
}

/// In-memory store implementing every repository trait
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Client>> {
        Ok(self.tables.read().await.clients.clone())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables.clients.iter().find(|c| c.email == email).cloned())
    }

    async fn save(&self, client: &Client) -> RepositoryResult<Client> {
        let mut tables = self.tables.write().await;
        if tables.client_exists(client.id) {
            return Err(conflict("Duplicate value violates constraint clients_pkey"));
        }
        if tables.clients.iter().any(|c| c.email == client.email) {
            return Err(conflict("Duplicate value violates constraint clients_email_key"));
        }
        tables.clients.push(client.clone());
        Ok(client.clone())
    }

    async fn update(&self, client: &Client) -> RepositoryResult<Option<Client>> {
        let mut tables = self.tables.write().await;
        if tables
            .clients
            .iter()
            .any(|c| c.id != client.id && c.email == client.email)
        {
            return Err(conflict("Duplicate value violates constraint clients_email_key"));
        }
        match tables.clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => {
                *existing = client.clone();
                Ok(Some(client.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.loans.iter().any(|l| l.client_id == id) {
            return Err(conflict("Foreign key constraint loans_client_id_fkey violated"));
        }
        let before = tables.clients.len();
        tables.clients.retain(|c| c.id != id);
        Ok(tables.clients.len() < before)
    }
}

#[async_trait]
impl LoanRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Loan>> {
        let tables = self.tables.read().await;
        Ok(tables.loans.iter().find(|l| l.id == id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Loan>> {
        Ok(self.tables.read().await.loans.clone())
    }

    async fn find_by_client_id(&self, client_id: Uuid) -> RepositoryResult<Option<Loan>> {
        let tables = self.tables.read().await;
        Ok(tables.loans.iter().find(|l| l.client_id == client_id).cloned())
    }

    async fn save(&self, loan: &Loan) -> RepositoryResult<Loan> {
        let mut tables = self.tables.write().await;
        if tables.loan_exists(loan.id) {
            return Err(conflict("Duplicate value violates constraint loans_pkey"));
        }
        if !tables.client_exists(loan.client_id) {
            return Err(conflict("Foreign key constraint loans_client_id_fkey violated"));
        }
        if tables.loans.iter().any(|l| l.client_id == loan.client_id) {
            return Err(conflict("Duplicate value violates constraint loans_client_id_key"));
        }
        tables.loans.push(loan.clone());
        Ok(loan.clone())
    }

    async fn update(&self, loan: &Loan) -> RepositoryResult<Option<Loan>> {
        let mut tables = self.tables.write().await;
        match tables.loans.iter_mut().find(|l| l.id == loan.id) {
            Some(existing) => {
                existing.amount = loan.amount;
                existing.status = loan.status;
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.collections.iter().any(|c| c.loan_id == id) {
            return Err(conflict(
                "Foreign key constraint loan_collections_loan_id_fkey violated",
            ));
        }
        let before = tables.loans.len();
        tables.loans.retain(|l| l.id != id);
        Ok(tables.loans.len() < before)
    }
}

#[async_trait]
impl LoanCollectionRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanCollection>> {
        let tables = self.tables.read().await;
        Ok(tables.collections.iter().find(|c| c.id == id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<LoanCollection>> {
        Ok(self.tables.read().await.collections.clone())
    }

    async fn find_by_loan_id(&self, loan_id: Uuid) -> RepositoryResult<Vec<LoanCollection>> {
        let tables = self.tables.read().await;
        Ok(tables
            .collections
            .iter()
            .filter(|c| c.loan_id == loan_id)
            .cloned()
            .collect())
    }

    async fn count_by_loan_id(&self, loan_id: Uuid) -> RepositoryResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.collections.iter().filter(|c| c.loan_id == loan_id).count() as i64)
    }

    async fn save(&self, collection: &LoanCollection) -> RepositoryResult<LoanCollection> {
        let mut tables = self.tables.write().await;
        if tables.collections.iter().any(|c| c.id == collection.id) {
            return Err(conflict("Duplicate value violates constraint loan_collections_pkey"));
        }
        if !tables.loan_exists(collection.loan_id) {
            return Err(conflict(
                "Foreign key constraint loan_collections_loan_id_fkey violated",
            ));
        }
        tables.collections.push(collection.clone());
        Ok(collection.clone())
    }

    async fn update(
        &self,
        collection: &LoanCollection,
    ) -> RepositoryResult<Option<LoanCollection>> {
        let mut tables = self.tables.write().await;
        if !tables.loan_exists(collection.loan_id) {
            return Err(conflict(
                "Foreign key constraint loan_collections_loan_id_fkey violated",
            ));
        }
        match tables.collections.iter_mut().find(|c| c.id == collection.id) {
            Some(existing) => {
                *existing = collection.clone();
                Ok(Some(collection.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.collections.len();
        tables.collections.retain(|c| c.id != id);
        Ok(tables.collections.len() < before)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        let by_username = tables.users.iter().find(|u| u.username == identifier);
        Ok(by_username
            .or_else(|| tables.users.iter().find(|u| u.email == identifier))
            .cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn save(&self, user: &User) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(conflict("Duplicate value violates constraint users_username_key"));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(conflict("Duplicate value violates constraint users_email_key"));
        }
        tables.users.push(user.clone());
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanStatus;
    use chrono::Utc;

    fn client(email: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Achieng Otieno".to_string(),
            email: email.to_string(),
            address: "Kisumu".to_string(),
        }
    }

    fn loan_for(client_id: Uuid) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            amount: 10_000,
            status: LoanStatus::Pending,
            client_id,
        }
    }

    #[tokio::test]
    async fn test_client_email_is_unique() {
        let store = InMemoryStore::new();
        ClientRepository::save(&store, &client("a@example.com")).await.unwrap();

        let err = ClientRepository::save(&store, &client("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_client_owns_at_most_one_loan() {
        let store = InMemoryStore::new();
        let owner = ClientRepository::save(&store, &client("b@example.com")).await.unwrap();
        LoanRepository::save(&store, &loan_for(owner.id)).await.unwrap();

        let err = LoanRepository::save(&store, &loan_for(owner.id))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_loan_with_collections_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let owner = ClientRepository::save(&store, &client("c@example.com")).await.unwrap();
        let loan = LoanRepository::save(&store, &loan_for(owner.id)).await.unwrap();
        let collection = LoanCollection {
            id: Uuid::new_v4(),
            loan_id: loan.id,
            amount: 500,
            collected_at: Utc::now(),
        };
        LoanCollectionRepository::save(&store, &collection).await.unwrap();

        assert!(LoanRepository::delete(&store, loan.id).await.is_err());
        assert!(LoanCollectionRepository::delete(&store, collection.id).await.unwrap());
        assert!(LoanRepository::delete(&store, loan.id).await.unwrap());
        assert!(!LoanRepository::delete(&store, loan.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_loan_id() {
        let store = InMemoryStore::new();
        let owner = ClientRepository::save(&store, &client("d@example.com")).await.unwrap();
        let loan = LoanRepository::save(&store, &loan_for(owner.id)).await.unwrap();
        assert_eq!(store.count_by_loan_id(loan.id).await.unwrap(), 0);

        for amount in [100, 200, 300] {
            let collection = LoanCollection {
                id: Uuid::new_v4(),
                loan_id: loan.id,
                amount,
                collected_at: Utc::now(),
            };
            LoanCollectionRepository::save(&store, &collection).await.unwrap();
        }
        assert_eq!(store.count_by_loan_id(loan.id).await.unwrap(), 3);
        assert_eq!(store.count_by_loan_id(Uuid::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_user_by_username_or_email() {
        let store = InMemoryStore::new();
        let user = User {
            id: Uuid::new_v4(),
            username: "wnjoroge".to_string(),
            email: "wnjoroge@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: crate::models::UserRole::Officer,
            created_at: Utc::now(),
        };
        UserRepository::save(&store, &user).await.unwrap();

        let by_name = store.find_by_username_or_email("wnjoroge").await.unwrap();
        let by_email = store
            .find_by_username_or_email("wnjoroge@example.com")
            .await
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(user.id));
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        assert!(store.find_by_username_or_email("nobody").await.unwrap().is_none());
    }
}
