//! # Inkpost Gateway
//!
//! Adapters for the hosted backend the client delegates to. The hosted
//! service itself lives outside this repository; the in-memory gateway
//! reproduces its observable contract - row CRUD with exact counts,
//! password auth, token-bearing sessions, and auth-change notifications -
//! for local runs and tests.

pub mod auth;
pub mod memory;

pub use auth::{AuthError, CredentialHasher, SessionTokens, TokenConfig};
pub use memory::InMemoryGateway;
