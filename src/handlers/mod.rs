//! API handlers for the EntryVentures backend

pub mod auth;
pub mod clients;
mod extract;
pub mod loan_collections;
pub mod loans;
pub mod users;

pub use extract::ValidatedJson;

// Re-export the principal extractors for handler use
pub use crate::middleware::auth::{AdminUser, AuthenticatedUser};
