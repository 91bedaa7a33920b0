//! Middleware: request tracing, security headers, CORS and authentication

pub mod auth;
mod security;
mod tracing;

pub use auth::{authentication_entry_point, token_filter, AdminUser, AuthenticatedUser};
pub use security::{cors_layer, security_headers, SecurityHeaders};
pub use tracing::request_tracing;
