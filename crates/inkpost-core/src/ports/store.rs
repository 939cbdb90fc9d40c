//! Row-store ports - the gateway's table API for blogs and profiles.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Blog, BlogPatch, NewBlog, NewProfile, UserProfile};
use crate::error::GatewayError;

/// One requested window over the blog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Window for a 1-based page number.
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        Self {
            offset: u64::from(page - 1) * u64::from(page_size),
            limit: u64::from(page_size),
        }
    }
}

/// A window of blog rows plus the exact total row count.
#[derive(Debug, Clone)]
pub struct BlogPage {
    pub rows: Vec<Blog>,
    pub total: u64,
}

/// Blog row storage behind the gateway.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Insert a new row. The gateway assigns id and created_at.
    async fn insert(&self, draft: NewBlog) -> Result<Blog, GatewayError>;

    /// Update title and content by id. The gateway stamps updated_at.
    async fn update(&self, id: Uuid, patch: BlogPatch) -> Result<Blog, GatewayError>;

    /// Delete the row with the given id.
    async fn delete(&self, id: Uuid) -> Result<(), GatewayError>;

    /// Fetch a single row by id.
    async fn fetch(&self, id: Uuid) -> Result<Option<Blog>, GatewayError>;

    /// Fetch one window of rows ordered by created_at descending,
    /// together with the exact total count.
    async fn page(&self, request: PageRequest) -> Result<BlogPage, GatewayError>;
}

/// User directory ("users" table).
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Profile row for the given email, if present.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, GatewayError>;

    /// Write the profile row created at registration.
    async fn create_profile(&self, profile: NewProfile) -> Result<UserProfile, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_windows_are_contiguous() {
        assert_eq!(PageRequest::for_page(1, 5), PageRequest { offset: 0, limit: 5 });
        assert_eq!(PageRequest::for_page(2, 5), PageRequest { offset: 5, limit: 5 });
        assert_eq!(PageRequest::for_page(3, 5), PageRequest { offset: 10, limit: 5 });
    }

    #[test]
    fn page_request_clamps_page_zero() {
        assert_eq!(PageRequest::for_page(0, 5), PageRequest { offset: 0, limit: 5 });
    }
}
