//! In-memory gateway implementation.
//!
//! Stands in for the hosted backend during local runs and tests.
//! State lives in process memory only and is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use inkpost_core::domain::{
    AuthEvent, AuthUser, Blog, BlogPatch, NewBlog, NewProfile, Session, UserProfile,
};
use inkpost_core::error::GatewayError;
use inkpost_core::ports::{AuthGateway, AuthWatcher, BlogPage, BlogStore, PageRequest, UserDirectory};

use crate::auth::{AuthError, CredentialHasher, SessionTokens, TokenConfig};

/// Auth account record. Credentials never leave this module.
struct Account {
    id: Uuid,
    email: String,
    password_hash: String,
}

/// Stored blog row. `author_id` is a write-only column: inserts carry
/// it, selects never return it.
struct BlogRow {
    blog: Blog,
    #[allow(dead_code)]
    author_id: Uuid,
}

/// In-memory gateway covering the auth API, the blogs table, and the
/// user directory.
pub struct InMemoryGateway {
    accounts: RwLock<HashMap<String, Account>>,
    profiles: RwLock<Vec<UserProfile>>,
    blogs: RwLock<HashMap<Uuid, BlogRow>>,
    session: RwLock<Option<Session>>,
    auth_events: broadcast::Sender<AuthEvent>,
    hasher: CredentialHasher,
    tokens: SessionTokens,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::with_tokens(SessionTokens::new(TokenConfig::default()))
    }

    pub fn with_tokens(tokens: SessionTokens) -> Self {
        let (auth_events, _) = broadcast::channel(16);

        Self {
            accounts: RwLock::new(HashMap::new()),
            profiles: RwLock::new(Vec::new()),
            blogs: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            auth_events,
            hasher: CredentialHasher::new(),
            tokens,
        }
    }

    pub fn from_env() -> Self {
        Self::with_tokens(SessionTokens::from_env())
    }

    /// Insert a blog row with a caller-provided creation time. Used to
    /// seed demo data with spread-out timestamps.
    pub async fn seed_blog(&self, draft: NewBlog, created_at: DateTime<Utc>) -> Blog {
        let blog = Blog {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            author_email: draft.author_email,
            created_at,
            updated_at: None,
        };

        let mut blogs = self.blogs.write().await;
        blogs.insert(
            blog.id,
            BlogRow {
                blog: blog.clone(),
                author_id: draft.author_id,
            },
        );

        blog
    }

    /// Number of live auth-change subscriptions.
    pub fn auth_listener_count(&self) -> usize {
        self.auth_events.receiver_count()
    }

    fn publish(&self, event: AuthEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.auth_events.send(event);
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for InMemoryGateway {
    async fn current_user(&self) -> Result<Option<AuthUser>, GatewayError> {
        let mut session = self.session.write().await;

        let Some(current) = session.clone() else {
            return Ok(None);
        };

        match self.tokens.decode(&current.access_token) {
            Ok(_) => Ok(Some(current.user)),
            Err(AuthError::TokenExpired | AuthError::InvalidToken(_)) => {
                // Dead session: clear it and tell listeners.
                tracing::debug!("Session token no longer valid, signing out");
                *session = None;
                drop(session);
                self.publish(AuthEvent::SignedOut);
                Ok(None)
            }
            Err(e) => Err(GatewayError::Request(e.to_string())),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError> {
        let mut accounts = self.accounts.write().await;

        if accounts.contains_key(email) {
            return Err(GatewayError::EmailTaken);
        }

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let account = Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
        };
        let user = AuthUser {
            id: account.id,
            email: Some(account.email.clone()),
            avatar_url: None,
        };
        accounts.insert(account.email.clone(), account);

        tracing::debug!(user_id = %user.id, "Account registered");

        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let (id, verified) = {
            let accounts = self.accounts.read().await;
            let Some(account) = accounts.get(email) else {
                return Err(GatewayError::InvalidCredentials);
            };

            let verified = self
                .hasher
                .verify(password, &account.password_hash)
                .map_err(|e| GatewayError::Request(e.to_string()))?;
            (account.id, verified)
        };

        if !verified {
            return Err(GatewayError::InvalidCredentials);
        }

        let user = AuthUser {
            id,
            email: Some(email.to_string()),
            avatar_url: None,
        };
        let access_token = self
            .tokens
            .issue(&user)
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        let established = Session {
            user: user.clone(),
            access_token,
        };

        *self.session.write().await = Some(established.clone());
        self.publish(AuthEvent::SignedIn(user));

        tracing::debug!(user_id = %established.user.id, "Session established");

        Ok(established)
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let had_session = self.session.write().await.take().is_some();

        if had_session {
            self.publish(AuthEvent::SignedOut);
            tracing::debug!("Session ended");
        }

        Ok(())
    }

    fn watch_auth(&self) -> AuthWatcher {
        AuthWatcher::new(self.auth_events.subscribe())
    }
}

#[async_trait]
impl BlogStore for InMemoryGateway {
    async fn insert(&self, draft: NewBlog) -> Result<Blog, GatewayError> {
        let blog = self.seed_blog(draft, Utc::now()).await;
        tracing::debug!(blog_id = %blog.id, "Blog row inserted");
        Ok(blog)
    }

    async fn update(&self, id: Uuid, patch: BlogPatch) -> Result<Blog, GatewayError> {
        let mut blogs = self.blogs.write().await;

        let Some(row) = blogs.get_mut(&id) else {
            return Err(GatewayError::NotFound);
        };

        row.blog.title = patch.title;
        row.blog.content = patch.content;
        row.blog.updated_at = Some(Utc::now());

        tracing::debug!(blog_id = %id, "Blog row updated");

        Ok(row.blog.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), GatewayError> {
        let mut blogs = self.blogs.write().await;

        if blogs.remove(&id).is_none() {
            return Err(GatewayError::NotFound);
        }

        tracing::debug!(blog_id = %id, "Blog row deleted");

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Blog>, GatewayError> {
        let blogs = self.blogs.read().await;
        Ok(blogs.get(&id).map(|row| row.blog.clone()))
    }

    async fn page(&self, request: PageRequest) -> Result<BlogPage, GatewayError> {
        let blogs = self.blogs.read().await;

        let mut sorted: Vec<Blog> = blogs.values().map(|row| row.blog.clone()).collect();
        // Newest first; id as tie-break keeps windows stable when
        // timestamps collide.
        sorted.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = sorted.len() as u64;
        let start = request.offset.min(total) as usize;
        let end = request.offset.saturating_add(request.limit).min(total) as usize;
        let rows = sorted[start..end].to_vec();

        tracing::debug!(
            offset = request.offset,
            limit = request.limit,
            returned = rows.len(),
            total,
            "Blog page served"
        );

        Ok(BlogPage { rows, total })
    }
}

#[async_trait]
impl UserDirectory for InMemoryGateway {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, GatewayError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Looking up profile by email");

        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.email == email).cloned())
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<UserProfile, GatewayError> {
        let mut profiles = self.profiles.write().await;

        if profiles.iter().any(|p| p.email == profile.email) {
            return Err(GatewayError::Request("Profile already exists".to_string()));
        }

        let row = UserProfile {
            id: profile.id,
            full_name: profile.full_name,
            email: profile.email,
            created_at: Utc::now(),
        };
        profiles.push(row.clone());

        Ok(row)
    }
}
