//! PostgreSQL repositories backed by a sqlx pool

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    ClientRepository, LoanCollectionRepository, LoanRepository, RepositoryResult, UserRepository,
};
use crate::models::{Client, Loan, LoanCollection, User};

/// sqlx-backed store implementing every repository trait
#[derive(Clone)]
pub struct PgStore {
    db_pool: PgPool,
}

impl PgStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ClientRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, address FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(client)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, address FROM clients ORDER BY name",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(clients)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, email, address FROM clients WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(client)
    }

    async fn save(&self, client: &Client) -> RepositoryResult<Client> {
        let saved = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, name, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, address
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.address)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(saved)
    }

    async fn update(&self, client: &Client) -> RepositoryResult<Option<Client>> {
        let updated = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET name = $2, email = $3, address = $4
            WHERE id = $1
            RETURNING id, name, email, address
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.address)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LoanRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, amount, status, client_id FROM loans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(loan)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT id, amount, status, client_id FROM loans")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(loans)
    }

    async fn find_by_client_id(&self, client_id: Uuid) -> RepositoryResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT id, amount, status, client_id FROM loans WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(loan)
    }

    async fn save(&self, loan: &Loan) -> RepositoryResult<Loan> {
        let saved = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (id, amount, status, client_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, amount, status, client_id
            "#,
        )
        .bind(loan.id)
        .bind(loan.amount)
        .bind(loan.status)
        .bind(loan.client_id)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(saved)
    }

    async fn update(&self, loan: &Loan) -> RepositoryResult<Option<Loan>> {
        // client_id is immutable once the loan exists
        let updated = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET amount = $2, status = $3
            WHERE id = $1
            RETURNING id, amount, status, client_id
            "#,
        )
        .bind(loan.id)
        .bind(loan.amount)
        .bind(loan.status)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LoanCollectionRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<LoanCollection>> {
        let collection = sqlx::query_as::<_, LoanCollection>(
            "SELECT id, loan_id, amount, collected_at FROM loan_collections WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(collection)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<LoanCollection>> {
        let collections = sqlx::query_as::<_, LoanCollection>(
            "SELECT id, loan_id, amount, collected_at FROM loan_collections ORDER BY collected_at",
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(collections)
    }

    async fn find_by_loan_id(&self, loan_id: Uuid) -> RepositoryResult<Vec<LoanCollection>> {
        let collections = sqlx::query_as::<_, LoanCollection>(
            r#"
            SELECT id, loan_id, amount, collected_at FROM loan_collections
            WHERE loan_id = $1
            ORDER BY collected_at
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(collections)
    }

    async fn count_by_loan_id(&self, loan_id: Uuid) -> RepositoryResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loan_collections WHERE loan_id = $1")
                .bind(loan_id)
                .fetch_one(&self.db_pool)
                .await?;
        Ok(count)
    }

    async fn save(&self, collection: &LoanCollection) -> RepositoryResult<LoanCollection> {
        let saved = sqlx::query_as::<_, LoanCollection>(
            r#"
            INSERT INTO loan_collections (id, loan_id, amount, collected_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, loan_id, amount, collected_at
            "#,
        )
        .bind(collection.id)
        .bind(collection.loan_id)
        .bind(collection.amount)
        .bind(collection.collected_at)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(saved)
    }

    async fn update(
        &self,
        collection: &LoanCollection,
    ) -> RepositoryResult<Option<LoanCollection>> {
        let mut tx = self.db_pool.begin().await?;

        // Row lock is held until commit
        let exists = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM loan_collections WHERE id = $1 FOR UPDATE",
        )
        .bind(collection.id)
        .fetch_optional(&mut *tx)
        .await?;

        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, LoanCollection>(
            r#"
            UPDATE loan_collections SET loan_id = $2, amount = $3, collected_at = $4
            WHERE id = $1
            RETURNING id, loan_id, amount, collected_at
            "#,
        )
        .bind(collection.id)
        .bind(collection.loan_id)
        .bind(collection.amount)
        .bind(collection.collected_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM loan_collections WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.db_pool)
        .await?;
        Ok(user)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;
        Ok(users)
    }

    async fn save(&self, user: &User) -> RepositoryResult<User> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, role, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .fetch_one(&self.db_pool)
        .await?;
        Ok(saved)
    }
}
