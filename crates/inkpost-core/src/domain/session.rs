use serde::{Deserialize, Serialize};

use crate::domain::AuthUser;

/// An established gateway session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: String,
}

/// Auth-state transition broadcast by the gateway.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SignedOut,
}

impl AuthEvent {
    /// The identity this transition leaves in place.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthEvent::SignedIn(user) => Some(user),
            AuthEvent::SignedOut => None,
        }
    }
}
