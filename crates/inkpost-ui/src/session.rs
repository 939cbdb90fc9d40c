//! Session State - the single source of truth for the viewer identity.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use inkpost_core::domain::AuthUser;
use inkpost_core::ports::AuthGateway;

/// Owns the gateway auth subscription and republishes the current
/// identity on a watch channel. Every consumer reads the same value
/// through `watch()`/`user()`/`email()`; no secondary cached copy of
/// the email exists anywhere.
pub struct SessionController {
    current: watch::Sender<Option<AuthUser>>,
    forwarder: Option<JoinHandle<()>>,
}

impl SessionController {
    /// Resolve the current user once at startup, then forward auth
    /// transitions until the controller is shut down or dropped.
    pub async fn start(auth: Arc<dyn AuthGateway>) -> Self {
        let initial = match auth.current_user().await {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "Could not resolve current user at startup");
                None
            }
        };

        let (current, _) = watch::channel(initial);
        let mut watcher = auth.watch_auth();
        let forward = current.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = watcher.next().await {
                tracing::debug!(signed_in = event.user().is_some(), "Auth state changed");
                forward.send_replace(event.user().cloned());
            }
        });

        Self {
            current,
            forwarder: Some(forwarder),
        }
    }

    /// Subscribe to identity changes.
    pub fn watch(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    /// Snapshot of the current identity.
    pub fn user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    /// The session email ownership checks compare against.
    pub fn email(&self) -> Option<String> {
        self.current.borrow().as_ref().and_then(|u| u.email.clone())
    }

    /// Release the auth subscription deterministically and wait for
    /// the forwarder to finish.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.forwarder.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // The subscription must not outlive the view that owns it.
        if let Some(handle) = &self.forwarder {
            handle.abort();
        }
    }
}
