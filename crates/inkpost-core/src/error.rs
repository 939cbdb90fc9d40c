//! Domain-level error types.

use thiserror::Error;

/// Client-side failures caught before any gateway call is issued.
///
/// Messages are rendered inline in the owning view, so variants carry
/// exactly the text the user sees.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("User not authenticated")]
    Unauthenticated,
}

/// Failures reported by the hosted gateway.
///
/// The message string is surfaced to the user verbatim and never
/// retried automatically, so the credential and duplicate-registration
/// variants use the service's own phrasing.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("User already registered")]
    EmailTaken,

    #[error("Row not found")]
    NotFound,

    #[error("Request failed: {0}")]
    Request(String),
}
