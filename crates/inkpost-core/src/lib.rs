//! # Inkpost Core
//!
//! The domain layer of the Inkpost blog client.
//! This crate contains the entities, the gateway ports, and the error
//! taxonomy - no infrastructure, no rendering.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, GatewayError};
