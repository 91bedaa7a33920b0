//! Authentication module
//!
//! - Username/email + password login with bcrypt hashes
//! - JWT access token generation and validation
//! - API user management

mod jwt;
mod password;
mod service;

pub use jwt::{generate_access_token, verify_token, Claims, JwtError};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthError, AuthService};
