//! Application state - the wired gateway ports shared by every view.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};

use inkpost_core::domain::{NewBlog, NewProfile};
use inkpost_core::ports::{AuthGateway, BlogStore, UserDirectory};
use inkpost_gateway::InMemoryGateway;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthGateway>,
    pub blogs: Arc<dyn BlogStore>,
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Wire the gateway adapter. The hosted backend is an external
    /// service; local runs talk to the in-memory stand-in.
    pub async fn new(config: &AppConfig) -> Self {
        let gateway = Arc::new(InMemoryGateway::from_env());

        if config.seed_demo_data {
            seed_demo_data(&gateway, config.seed_posts).await;
        }

        tracing::info!("Application state initialized");

        Self {
            auth: gateway.clone(),
            blogs: gateway.clone(),
            users: gateway,
        }
    }
}

/// Demo author plus back-dated posts, so pagination has something to
/// show on first launch.
async fn seed_demo_data(gateway: &Arc<InMemoryGateway>, posts: usize) {
    let author = match gateway.sign_up("demo@inkpost.dev", "demo-password").await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Demo seeding skipped");
            return;
        }
    };

    if let Err(e) = gateway
        .create_profile(NewProfile {
            id: author.id,
            full_name: "Demo Author".to_string(),
            email: "demo@inkpost.dev".to_string(),
        })
        .await
    {
        tracing::warn!(error = %e, "Demo profile creation failed");
    }

    let now = Utc::now();
    for i in 0..posts {
        let Ok(draft) = NewBlog::new(
            &format!("Demo post #{}", posts - i),
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
             eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut \
             enim ad minim veniam, quis nostrud exercitation ullamco.",
            author.id,
            author.email.clone(),
        ) else {
            continue;
        };
        gateway.seed_blog(draft, now - TimeDelta::hours(i as i64)).await;
    }

    tracing::info!(posts, "Demo data seeded");
}
