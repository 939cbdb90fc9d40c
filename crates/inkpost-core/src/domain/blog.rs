use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Blog entity - one post row as stored by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Email of the creating user, captured at creation time. Never
    /// rewritten, even if the account email changes later.
    pub author_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Blog {
    /// Content preview for list cards, truncated on a char boundary.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut chars = self.content.char_indices();
        match chars.nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }
}

/// Fields for a new blog row. The gateway assigns id and created_at.
///
/// `author_id` is stored on the row but never selected back; ownership
/// checks go through `author_email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_email: Option<String>,
}

impl NewBlog {
    /// Validate and build a draft. Title and content must be non-empty
    /// after trimming; the gateway is not assumed to enforce this.
    pub fn new(
        title: &str,
        content: &str,
        author_id: Uuid,
        author_email: Option<String>,
    ) -> Result<Self, DomainError> {
        require_title_and_content(title, content)?;

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            author_email,
        })
    }
}

/// The two fields an owner may edit. The gateway stamps updated_at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPatch {
    pub title: String,
    pub content: String,
}

impl BlogPatch {
    pub fn new(title: &str, content: &str) -> Result<Self, DomainError> {
        require_title_and_content(title, content)?;

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}

fn require_title_and_content(title: &str, content: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(DomainError::Validation(
            "Title and content are required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog_with_content(content: &str) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            content: content.to_string(),
            author_email: Some("a@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn draft_rejects_blank_title() {
        let result = NewBlog::new("   ", "content", Uuid::new_v4(), None);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn draft_rejects_blank_content() {
        let result = BlogPatch::new("title", "\t\n");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Title and content are required");
    }

    #[test]
    fn draft_keeps_fields_verbatim() {
        let draft = NewBlog::new("  spaced  ", "body", Uuid::new_v4(), None).unwrap();
        // Trimming is a validation concern only; stored text is untouched.
        assert_eq!(draft.title, "  spaced  ");
    }

    #[test]
    fn excerpt_passes_short_content_through() {
        let blog = blog_with_content("short");
        assert_eq!(blog.excerpt(150), "short");
    }

    #[test]
    fn excerpt_truncates_long_content() {
        let blog = blog_with_content(&"x".repeat(200));
        let excerpt = blog.excerpt(150);
        assert_eq!(excerpt.len(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let blog = blog_with_content(&"ü".repeat(200));
        let excerpt = blog.excerpt(150);
        assert_eq!(excerpt.chars().count(), 153);
    }
}
