//! Modal dialogs.
//!
//! Dialogs share a pattern rather than a base type: the shell holds an
//! `Option<Dialog>` whose `Some` is "open", each dialog owns its own
//! form fields, and the one dismissal path - dropping it back to
//! `None` - restores the prior page state with no partial effects.
//! Dialogs never share state with each other; everything travels
//! through the list and card view models' public contracts.

use uuid::Uuid;

use inkpost_core::domain::{AuthUser, Blog, BlogPatch, NewBlog, NewProfile, Session};
use inkpost_core::error::DomainError;
use inkpost_core::ports::{AuthGateway, BlogStore, UserDirectory};

use crate::list::{RefreshHandle, RefreshReason};

/// Which form the auth dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Login/register modal. One dialog, two modes, switchable in place.
pub struct AuthDialog {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    mode: AuthMode,
    submitting: bool,
    error: Option<String>,
}

impl AuthDialog {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            full_name: String::new(),
            mode,
            submitting: false,
            error: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Toggle between login and register, clearing any stale error.
    pub fn switch_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err("Email and password are required".to_string());
        }

        if self.mode == AuthMode::Register {
            if self.full_name.trim().is_empty() {
                return Err("Full name is required".to_string());
            }
            if self.password != self.confirm_password {
                return Err("Passwords do not match".to_string());
            }
            if self.password.len() < 6 {
                return Err("Password must be at least 6 characters".to_string());
            }
        }

        Ok(())
    }

    /// Submit the form. Validation failures never reach the gateway.
    /// Returns the established session when the dialog should close;
    /// on failure the dialog stays open with the error rendered.
    pub async fn submit(
        &mut self,
        auth: &dyn AuthGateway,
        directory: &dyn UserDirectory,
    ) -> Option<Session> {
        if self.submitting {
            return None;
        }
        self.error = None;

        if let Err(message) = self.validate() {
            self.error = Some(message);
            return None;
        }

        self.submitting = true;
        let outcome = self.run_submit(auth, directory).await;
        self.submitting = false;

        match outcome {
            Ok(session) => Some(session),
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    async fn run_submit(
        &self,
        auth: &dyn AuthGateway,
        directory: &dyn UserDirectory,
    ) -> Result<Session, String> {
        if self.mode == AuthMode::Register {
            let user = auth
                .sign_up(&self.email, &self.password)
                .await
                .map_err(|e| e.to_string())?;

            let profile = NewProfile {
                id: user.id,
                full_name: self.full_name.clone(),
                email: self.email.clone(),
            };
            directory
                .create_profile(profile)
                .await
                .map_err(|_| "User profile creation failed".to_string())?;
        }

        auth.sign_in(&self.email, &self.password)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Whether the create dialog found a signed-in author when it opened.
enum CreateGate {
    SignInRequired,
    Ready { author: AuthUser },
}

/// Create-blog modal.
///
/// The auth check runs exactly once, when the dialog opens. While no
/// user is signed in the dialog stays open showing a sign-in prompt
/// with submission disabled; it never dismisses itself.
pub struct CreateDialog {
    pub title: String,
    pub content: String,
    gate: CreateGate,
    submitting: bool,
    error: Option<String>,
}

impl CreateDialog {
    pub async fn open(auth: &dyn AuthGateway) -> Self {
        let gate = match auth.current_user().await {
            Ok(Some(user)) => CreateGate::Ready { author: user },
            Ok(None) => CreateGate::SignInRequired,
            Err(e) => {
                tracing::debug!(error = %e, "Auth check failed opening create dialog");
                CreateGate::SignInRequired
            }
        };

        Self {
            title: String::new(),
            content: String::new(),
            gate,
            submitting: false,
            error: None,
        }
    }

    pub fn needs_sign_in(&self) -> bool {
        matches!(self.gate, CreateGate::SignInRequired)
    }

    /// Shown in place of the form while signed out.
    pub fn sign_in_prompt() -> &'static str {
        "Please login to create a blog."
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit the draft. Returns the created blog when the dialog
    /// should close; the refresh notification has already been sent.
    pub async fn submit(
        &mut self,
        store: &dyn BlogStore,
        refresh: &RefreshHandle,
    ) -> Option<Blog> {
        if self.submitting {
            return None;
        }
        self.error = None;

        let CreateGate::Ready { author } = &self.gate else {
            self.error = Some(DomainError::Unauthenticated.to_string());
            return None;
        };

        let draft = match NewBlog::new(&self.title, &self.content, author.id, author.email.clone())
        {
            Ok(draft) => draft,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.submitting = true;
        let result = store.insert(draft).await;
        self.submitting = false;

        match result {
            Ok(blog) => {
                self.title.clear();
                self.content.clear();
                refresh.notify(RefreshReason::Created);
                Some(blog)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

enum EditState {
    /// The row could not be loaded; terminal, save is disabled.
    Unavailable,
    Ready,
    Saving,
}

/// Edit modal. Loads title and content fresh by id when it opens, the
/// way the edit route does.
pub struct EditDialog {
    blog_id: Uuid,
    pub title: String,
    pub content: String,
    state: EditState,
    error: Option<String>,
}

impl EditDialog {
    pub async fn load(id: Uuid, store: &dyn BlogStore) -> Self {
        let (state, error, fields) = match store.fetch(id).await {
            Ok(Some(blog)) => (EditState::Ready, None, Some((blog.title, blog.content))),
            Ok(None) => (
                EditState::Unavailable,
                Some("Blog not found".to_string()),
                None,
            ),
            Err(e) => (EditState::Unavailable, Some(e.to_string()), None),
        };
        let (title, content) = fields.unwrap_or_default();

        Self {
            blog_id: id,
            title,
            content,
            state,
            error,
        }
    }

    pub fn blog_id(&self) -> Uuid {
        self.blog_id
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.state, EditState::Unavailable)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, EditState::Saving)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Save the form. Empty-after-trim fields are rejected before any
    /// gateway call. Returns the updated row when the dialog should
    /// close; on failure it stays open with the error rendered.
    pub async fn save(&mut self, store: &dyn BlogStore) -> Option<Blog> {
        if !matches!(self.state, EditState::Ready) {
            return None;
        }
        self.error = None;

        let patch = match BlogPatch::new(&self.title, &self.content) {
            Ok(patch) => patch,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.state = EditState::Saving;
        let result = store.update(self.blog_id, patch).await;

        match result {
            Ok(blog) => {
                self.state = EditState::Ready;
                Some(blog)
            }
            Err(e) => {
                self.state = EditState::Ready;
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

/// Logout confirmation modal.
#[derive(Default)]
pub struct LogoutDialog {
    signing_out: bool,
    error: Option<String>,
}

impl LogoutDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signing_out(&self) -> bool {
        self.signing_out
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Confirm the logout. Returns true when the dialog should close.
    pub async fn confirm(&mut self, auth: &dyn AuthGateway) -> bool {
        if self.signing_out {
            return false;
        }
        self.signing_out = true;
        self.error = None;

        let result = auth.sign_out().await;
        self.signing_out = false;

        match result {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

/// Read-only full-post view.
pub struct ViewDialog {
    blog: Blog,
}

impl ViewDialog {
    pub fn new(blog: Blog) -> Self {
        Self { blog }
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use inkpost_gateway::InMemoryGateway;

    use super::*;
    use crate::list::BlogList;
    use crate::tests::support::gateway_with_user;

    fn register_form(gateway_email: &str) -> AuthDialog {
        let mut dialog = AuthDialog::new(AuthMode::Register);
        dialog.full_name = "Grace Hopper".to_string();
        dialog.email = gateway_email.to_string();
        dialog.password = "seawalnut".to_string();
        dialog.confirm_password = "seawalnut".to_string();
        dialog
    }

    #[tokio::test]
    async fn auth_dialog_requires_email_and_password() {
        let gateway = InMemoryGateway::new();
        let mut dialog = AuthDialog::new(AuthMode::Login);
        dialog.email = "   ".to_string();
        dialog.password = "hunter22".to_string();

        assert!(dialog.submit(&gateway, &gateway).await.is_none());

        assert_eq!(dialog.error(), Some("Email and password are required"));
    }

    #[tokio::test]
    async fn register_requires_a_full_name() {
        let gateway = InMemoryGateway::new();
        let mut dialog = register_form("grace@example.com");
        dialog.full_name = "  ".to_string();

        assert!(dialog.submit(&gateway, &gateway).await.is_none());

        assert_eq!(dialog.error(), Some("Full name is required"));
    }

    #[tokio::test]
    async fn register_requires_matching_passwords() {
        let gateway = InMemoryGateway::new();
        let mut dialog = register_form("grace@example.com");
        dialog.confirm_password = "seawalnuts".to_string();

        assert!(dialog.submit(&gateway, &gateway).await.is_none());

        assert_eq!(dialog.error(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn register_enforces_the_password_minimum() {
        let gateway = InMemoryGateway::new();
        let mut dialog = register_form("grace@example.com");
        dialog.password = "short".to_string();
        dialog.confirm_password = "short".to_string();

        assert!(dialog.submit(&gateway, &gateway).await.is_none());

        assert_eq!(dialog.error(), Some("Password must be at least 6 characters"));
        // Validation failures never reach the gateway.
        assert!(gateway.find_by_email("grace@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_creates_the_profile_and_signs_in() {
        let gateway = InMemoryGateway::new();
        let mut dialog = register_form("grace@example.com");

        let session = dialog.submit(&gateway, &gateway).await.unwrap();

        assert_eq!(session.user.email.as_deref(), Some("grace@example.com"));
        let profile = gateway
            .find_by_email("grace@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.full_name, "Grace Hopper");
        assert_eq!(profile.id, session.user.id);
    }

    #[tokio::test]
    async fn duplicate_registration_keeps_the_dialog_open() {
        let gateway = gateway_with_user("Ada Lovelace", "ada@example.com", "hunter22").await;
        let mut dialog = register_form("ada@example.com");

        assert!(dialog.submit(gateway.as_ref(), gateway.as_ref()).await.is_none());

        assert_eq!(dialog.error(), Some("User already registered"));
        assert!(!dialog.is_submitting());
    }

    #[tokio::test]
    async fn login_surfaces_bad_credentials_verbatim() {
        let gateway = gateway_with_user("Ada Lovelace", "ada@example.com", "hunter22").await;
        let mut dialog = AuthDialog::new(AuthMode::Login);
        dialog.email = "ada@example.com".to_string();
        dialog.password = "wrong".to_string();

        assert!(dialog.submit(gateway.as_ref(), gateway.as_ref()).await.is_none());

        assert_eq!(dialog.error(), Some("Invalid login credentials"));
    }

    #[tokio::test]
    async fn switching_modes_clears_the_error() {
        let gateway = InMemoryGateway::new();
        let mut dialog = AuthDialog::new(AuthMode::Login);

        assert!(dialog.submit(&gateway, &gateway).await.is_none());
        assert!(dialog.error().is_some());

        dialog.switch_mode();

        assert_eq!(dialog.mode(), AuthMode::Register);
        assert!(dialog.error().is_none());
    }

    #[tokio::test]
    async fn create_dialog_gates_on_the_one_time_auth_check() {
        let gateway = Arc::new(InMemoryGateway::new());
        let list = BlogList::new(gateway.clone());

        let mut dialog = CreateDialog::open(gateway.as_ref()).await;

        assert!(dialog.needs_sign_in());
        dialog.title = "t".to_string();
        dialog.content = "c".to_string();

        let created = dialog.submit(gateway.as_ref(), &list.refresh_handle()).await;

        assert!(created.is_none());
        assert_eq!(dialog.error(), Some("User not authenticated"));
    }

    #[tokio::test]
    async fn create_dialog_rejects_blank_drafts() {
        let gateway = gateway_with_user("Ada Lovelace", "ada@example.com", "hunter22").await;
        gateway.sign_in("ada@example.com", "hunter22").await.unwrap();
        let mut list = BlogList::new(gateway.clone());

        let mut dialog = CreateDialog::open(gateway.as_ref()).await;
        dialog.title = "title".to_string();
        dialog.content = " ".to_string();

        assert!(dialog.submit(gateway.as_ref(), &list.refresh_handle()).await.is_none());
        assert_eq!(dialog.error(), Some("Title and content are required"));

        list.refresh().await;
        assert_eq!(list.total(), 0);
    }

    #[tokio::test]
    async fn create_dialog_stamps_the_session_author() {
        let gateway = gateway_with_user("Ada Lovelace", "ada@example.com", "hunter22").await;
        gateway.sign_in("ada@example.com", "hunter22").await.unwrap();
        let mut list = BlogList::new(gateway.clone());

        let mut dialog = CreateDialog::open(gateway.as_ref()).await;
        assert!(!dialog.needs_sign_in());
        dialog.title = "First".to_string();
        dialog.content = "body".to_string();

        let created = dialog
            .submit(gateway.as_ref(), &list.refresh_handle())
            .await
            .unwrap();

        assert_eq!(created.author_email.as_deref(), Some("ada@example.com"));
        // The form resets for the next open.
        assert!(dialog.title.is_empty() && dialog.content.is_empty());
        assert!(list.process_notifications().await);
        assert_eq!(list.total(), 1);
    }

    #[tokio::test]
    async fn edit_dialog_load_of_a_missing_row_is_terminal() {
        let gateway = InMemoryGateway::new();

        let mut dialog = EditDialog::load(uuid::Uuid::new_v4(), &gateway).await;

        assert!(!dialog.is_available());
        assert_eq!(dialog.error(), Some("Blog not found"));

        dialog.title = "t".to_string();
        dialog.content = "c".to_string();
        assert!(dialog.save(&gateway).await.is_none());
    }

    #[tokio::test]
    async fn logout_dialog_ends_the_session() {
        let gateway = gateway_with_user("Ada Lovelace", "ada@example.com", "hunter22").await;
        gateway.sign_in("ada@example.com", "hunter22").await.unwrap();

        let mut dialog = LogoutDialog::new();
        assert!(dialog.confirm(gateway.as_ref()).await);

        assert!(gateway.current_user().await.unwrap().is_none());
        assert!(!dialog.is_signing_out());
    }
}
