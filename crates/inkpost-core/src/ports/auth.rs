//! Authentication port - the gateway's session API.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::{AuthEvent, AuthUser, Session};
use crate::error::GatewayError;

/// Session side of the hosted gateway.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Identity of the currently signed-in user, if any.
    async fn current_user(&self) -> Result<Option<AuthUser>, GatewayError>;

    /// Register a new account. Does not establish a session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError>;

    /// Password sign-in. Establishes the gateway session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    /// End the current session. Signing out without one is a no-op.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Subscribe to auth-state transitions. The watcher is a scoped
    /// resource: dropping it releases the subscription.
    fn watch_auth(&self) -> AuthWatcher;
}

/// Subscription handle for auth-state transitions.
pub struct AuthWatcher {
    rx: broadcast::Receiver<AuthEvent>,
}

impl AuthWatcher {
    pub fn new(rx: broadcast::Receiver<AuthEvent>) -> Self {
        Self { rx }
    }

    /// Next transition, or `None` once the gateway side is gone.
    /// A lagged receiver skips forward to the most recent events.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!(lagged = count, "Auth watcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
