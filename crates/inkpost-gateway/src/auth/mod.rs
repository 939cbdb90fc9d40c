//! Authentication building blocks for the in-memory gateway.

mod password;
mod token;

use thiserror::Error;

pub use password::CredentialHasher;
pub use token::{SessionClaims, SessionTokens, TokenConfig};

/// Authentication errors internal to the gateway adapter.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
