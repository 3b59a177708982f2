//! Authentication core.
//!
//! Provides password hashing, token issuance and verification, server-side
//! sessions and identity-provider assertion checks, shared by the local and
//! federated sign-in flows in `tally_api`.

pub mod identity;
pub mod jwt;
pub mod password;
pub mod session;

use thiserror::Error;

use crate::models::auth::InvalidEmail;
use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    NoToken,

    /// Bad signature or malformed payload.
    #[error("Invalid token")]
    InvalidToken,

    /// Signature valid, but past `exp`.
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid identity assertion: {0}")]
    InvalidAssertion(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<InvalidEmail> for AuthError {
    fn from(e: InvalidEmail) -> Self {
        AuthError::ValidationError(e.to_string())
    }
}
