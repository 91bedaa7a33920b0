//! Application state shared across handlers

use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::repository::{
    ClientRepository, InMemoryStore, LoanCollectionRepository, LoanRepository, PgStore,
    UserRepository,
};
use crate::services::ControllerService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub controller_service: Arc<ControllerService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(controller_service: Arc<ControllerService>, auth_service: Arc<AuthService>) -> Self {
        Self {
            controller_service,
            auth_service,
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(
        store: PgStore,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self::from_store(Arc::new(store), jwt_secret, access_token_ttl_seconds, bcrypt_cost)
    }

    /// State backed by the in-memory store
    pub fn in_memory(
        store: InMemoryStore,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self::from_store(Arc::new(store), jwt_secret, access_token_ttl_seconds, bcrypt_cost)
    }

    fn from_store<S>(
        store: Arc<S>,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self
    where
        S: ClientRepository
            + LoanRepository
            + LoanCollectionRepository
            + UserRepository
            + 'static,
    {
        let controller_service = ControllerService::new(store.clone(), store.clone(), store.clone());
        let auth_service =
            AuthService::new(store, jwt_secret, access_token_ttl_seconds, bcrypt_cost);

        Self::new(Arc::new(controller_service), Arc::new(auth_service))
    }
}

impl FromRef<AppState> for Arc<ControllerService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.controller_service.clone()
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}
