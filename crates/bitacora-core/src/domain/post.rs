use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Default number of posts per page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Upper bound a caller may request per page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Metadata of an uploaded post image.
///
/// The three fields are one atomic unit: a post either has all of them or
/// none, which is why they travel together behind a single `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    /// Public path the asset is served under, e.g. `/uploads/17211_cover.png`.
    pub url: String,
    pub mime: String,
    pub original_name: String,
}

/// Post entity - a blog article with free-text authorship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Display name of the author. Free text, not a user reference.
    pub author: String,
    /// Ordered tag list. Order is display-relevant only.
    pub tags: Vec<String>,
    pub image: Option<PostImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated input for creating a post.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    pub image: Option<PostImage>,
    /// Explicit creation instant; defaults to now when absent.
    pub created_at: Option<DateTime<Utc>>,
}

impl NewPost {
    /// Check the required-field and tag invariants without consuming the input.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::Validation("content must not be empty".into()));
        }
        if self.author.trim().is_empty() {
            return Err(DomainError::Validation("author must not be empty".into()));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(DomainError::Validation(
                "tags must be non-empty strings".into(),
            ));
        }
        Ok(())
    }

    /// Validate and build the entity with generated id and timestamps.
    pub fn into_post(self) -> Result<Post, DomainError> {
        self.validate()?;
        let now = Utc::now();
        Ok(Post {
            id: Uuid::new_v4(),
            title: self.title,
            content: self.content,
            author: self.author,
            tags: self.tags,
            image: self.image,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}

/// What to do with a post's image during a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImagePatch {
    /// Leave the current image untouched.
    #[default]
    Keep,
    /// Replace with a freshly stored image.
    Set(PostImage),
    /// Null out all three image fields. Takes precedence over a new upload
    /// supplied in the same request.
    Clear,
}

/// Partial update of a post. Only supplied fields change; everything else
/// is left untouched. This is the explicit replacement for merging
/// arbitrary request bodies into the document.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: ImagePatch,
}

impl PostPatch {
    /// Supplied fields must satisfy the same invariants as on creation.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("title must not be empty".into()));
            }
        }
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err(DomainError::Validation("content must not be empty".into()));
            }
        }
        if let Some(author) = &self.author {
            if author.trim().is_empty() {
                return Err(DomainError::Validation("author must not be empty".into()));
            }
        }
        if let Some(tags) = &self.tags {
            if tags.iter().any(|t| t.trim().is_empty()) {
                return Err(DomainError::Validation(
                    "tags must be non-empty strings".into(),
                ));
            }
        }
        Ok(())
    }

    /// Apply the patch in memory. Repositories mirror this when building
    /// their column updates; test fakes use it directly.
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(author) = &self.author {
            post.author = author.clone();
        }
        if let Some(tags) = &self.tags {
            post.tags = tags.clone();
        }
        match &self.image {
            ImagePatch::Keep => {}
            ImagePatch::Set(image) => post.image = Some(image.clone()),
            ImagePatch::Clear => post.image = None,
        }
        post.updated_at = Utc::now();
    }
}

/// Normalized list query: free-text filter plus pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Case-insensitive substring matched against title, content and tags.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            q: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PostQuery {
    /// Build a query from raw request input. Non-numeric or out-of-range
    /// paging values are coerced rather than rejected: page snaps up to 1,
    /// limit is clamped to `[1, MAX_PAGE_SIZE]`.
    pub fn from_raw(q: Option<&str>, page: Option<&str>, limit: Option<&str>) -> Self {
        let q = q
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1) as u64;
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u64;
        Self { q, page, limit }
    }
}

/// One page of posts plus the pagination totals callers need.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    /// Total documents matching the filter, across all pages.
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl PostPage {
    pub fn new(items: Vec<Post>, total: u64, query: &PostQuery) -> Self {
        Self {
            items,
            total,
            page: query.page,
            pages: total.div_ceil(query.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewPost {
        NewPost {
            title: "First".into(),
            content: "Hello".into(),
            author: "ana".into(),
            ..NewPost::default()
        }
    }

    #[test]
    fn into_post_defaults_tags_and_timestamps() {
        let post = valid_input().into_post().unwrap();

        assert!(post.tags.is_empty());
        assert!(post.image.is_none());
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn into_post_keeps_supplied_creation_instant() {
        let instant = "2024-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let post = NewPost {
            created_at: Some(instant),
            ..valid_input()
        }
        .into_post()
        .unwrap();

        assert_eq!(post.created_at, instant);
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        for field in ["title", "content", "author"] {
            let mut input = valid_input();
            match field {
                "title" => input.title = "  ".into(),
                "content" => input.content = String::new(),
                _ => input.author = String::new(),
            }
            assert!(matches!(
                input.into_post(),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn blank_tag_is_rejected() {
        let input = NewPost {
            tags: vec!["rust".into(), " ".into()],
            ..valid_input()
        };
        assert!(matches!(input.into_post(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let mut post = valid_input().into_post().unwrap();
        let patch = PostPatch {
            title: Some("Renamed".into()),
            ..PostPatch::default()
        };

        patch.apply(&mut post);

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.content, "Hello");
        assert_eq!(post.author, "ana");
    }

    #[test]
    fn clear_patch_removes_image() {
        let mut post = valid_input().into_post().unwrap();
        post.image = Some(PostImage {
            url: "/uploads/1_a.png".into(),
            mime: "image/png".into(),
            original_name: "a.png".into(),
        });

        let patch = PostPatch {
            image: ImagePatch::Clear,
            ..PostPatch::default()
        };
        patch.apply(&mut post);

        assert!(post.image.is_none());
    }

    #[test]
    fn query_coerces_bad_paging_input() {
        let query = PostQuery::from_raw(Some("  "), Some("zero"), Some("-3"));
        assert_eq!(query.q, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 1);

        let query = PostQuery::from_raw(Some("blog"), Some("2"), Some("500"));
        assert_eq!(query.q.as_deref(), Some("blog"));
        assert_eq!(query.page, 2);
        assert_eq!(query.limit, MAX_PAGE_SIZE);

        let query = PostQuery::from_raw(None, None, None);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_math_rounds_up() {
        let query = PostQuery {
            limit: 10,
            ..PostQuery::default()
        };
        assert_eq!(PostPage::new(Vec::new(), 25, &query).pages, 3);
        assert_eq!(PostPage::new(Vec::new(), 0, &query).pages, 0);
        assert_eq!(PostPage::new(Vec::new(), 10, &query).pages, 1);
    }
}
