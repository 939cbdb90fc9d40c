//! Post Card View Model.
//!
//! One card per listed row. The viewer identity is passed in
//! explicitly and updated from outside; a card never reads ambient
//! state to decide ownership.

use std::sync::Arc;

use inkpost_core::domain::Blog;
use inkpost_core::ports::{BlogStore, UserDirectory};

use crate::dialog::{EditDialog, ViewDialog};
use crate::list::{RefreshHandle, RefreshReason};

/// Resolution state of the author display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorName {
    Loading,
    Resolved(String),
    Unknown,
}

impl AuthorName {
    pub fn display(&self) -> &str {
        match self {
            AuthorName::Loading => "Loading...",
            AuthorName::Resolved(name) => name,
            AuthorName::Unknown => "Unknown author",
        }
    }
}

/// Delete confirmation state - the second phase of a two-phase delete.
#[derive(Debug, Default)]
pub struct DeleteConfirm {
    deleting: bool,
    error: Option<String>,
}

impl DeleteConfirm {
    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

pub struct BlogCard {
    blog: Blog,
    viewer_email: Option<String>,
    author: AuthorName,
    store: Arc<dyn BlogStore>,
    directory: Arc<dyn UserDirectory>,
    refresh: RefreshHandle,
    edit: Option<EditDialog>,
    delete: Option<DeleteConfirm>,
}

impl BlogCard {
    pub fn new(
        blog: Blog,
        viewer_email: Option<String>,
        store: Arc<dyn BlogStore>,
        directory: Arc<dyn UserDirectory>,
        refresh: RefreshHandle,
    ) -> Self {
        Self {
            blog,
            viewer_email,
            author: AuthorName::Loading,
            store,
            directory,
            refresh,
            edit: None,
            delete: None,
        }
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    /// Author line shown on the card: a placeholder until resolution
    /// completes, then the directory name or "Unknown author".
    pub fn author_name(&self) -> &str {
        self.author.display()
    }

    pub fn excerpt(&self) -> String {
        self.blog.excerpt(150)
    }

    /// Look up the author's display name in the user directory. A
    /// missing author email, a failed lookup, and an empty result all
    /// degrade to "Unknown author"; nothing is surfaced.
    pub async fn resolve_author(&mut self) {
        let Some(email) = self.blog.author_email.clone() else {
            self.author = AuthorName::Unknown;
            return;
        };

        self.author = match self.directory.find_by_email(&email).await {
            Ok(Some(profile)) => AuthorName::Resolved(profile.full_name),
            Ok(None) => AuthorName::Unknown,
            Err(e) => {
                tracing::debug!(error = %e, "Author lookup failed");
                AuthorName::Unknown
            }
        };
    }

    /// Swap in the current viewer identity; ownership is derived state
    /// and follows automatically.
    pub fn set_viewer(&mut self, viewer_email: Option<String>) {
        self.viewer_email = viewer_email;
    }

    /// The viewer owns this post iff their session email is present
    /// and equals the stored author email. Edit and delete affordances
    /// render only when this holds.
    pub fn is_owner(&self) -> bool {
        match (&self.viewer_email, &self.blog.author_email) {
            (Some(viewer), Some(author)) => viewer == author,
            _ => false,
        }
    }

    /// Open the read-only view of the full post.
    pub fn open_view(&self) -> ViewDialog {
        ViewDialog::new(self.blog.clone())
    }

    /// Open the edit dialog, loading the row fresh by id.
    pub async fn begin_edit(&mut self) {
        self.edit = Some(EditDialog::load(self.blog.id, self.store.as_ref()).await);
    }

    pub fn edit(&self) -> Option<&EditDialog> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditDialog> {
        self.edit.as_mut()
    }

    pub fn dismiss_edit(&mut self) {
        self.edit = None;
    }

    /// Save the open edit dialog. On success the dialog closes and the
    /// list is notified; on failure it stays open with the error.
    pub async fn save_edit(&mut self) -> bool {
        let Some(dialog) = self.edit.as_mut() else {
            return false;
        };

        let store = Arc::clone(&self.store);
        match dialog.save(store.as_ref()).await {
            Some(updated) => {
                self.blog = updated;
                self.edit = None;
                self.refresh.notify(RefreshReason::Edited);
                true
            }
            None => false,
        }
    }

    /// First phase of deletion: ask for confirmation.
    pub fn request_delete(&mut self) {
        if self.delete.is_none() {
            self.delete = Some(DeleteConfirm::default());
        }
    }

    pub fn delete_confirm(&self) -> Option<&DeleteConfirm> {
        self.delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.delete = None;
    }

    /// Second phase: issue the delete. Confirming without a pending
    /// request does nothing; a failure keeps the confirmation open
    /// with the error rendered.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(confirm) = self.delete.as_mut() else {
            return false;
        };
        if confirm.deleting {
            return false;
        }
        confirm.deleting = true;
        confirm.error = None;

        let store = Arc::clone(&self.store);
        let result = store.delete(self.blog.id).await;

        match result {
            Ok(()) => {
                self.delete = None;
                self.refresh.notify(RefreshReason::Deleted);
                true
            }
            Err(e) => {
                if let Some(confirm) = self.delete.as_mut() {
                    confirm.deleting = false;
                    confirm.error = Some(e.to_string());
                }
                false
            }
        }
    }
}
