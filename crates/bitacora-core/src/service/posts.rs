//! Post operations: validated creation, filtered listing, partial updates.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Post, PostPage, PostPatch, PostQuery};
use crate::error::DomainError;
use crate::ports::{BaseRepository, PostRepository};
use crate::service::ServiceError;

/// Composition point for the posts resource.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    pub async fn list(&self, query: &PostQuery) -> Result<PostPage, ServiceError> {
        Ok(self.posts.list(query).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Post, ServiceError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Validate and persist a single post.
    pub async fn create(&self, input: NewPost) -> Result<Post, ServiceError> {
        let post = input.into_post()?;
        Ok(self.posts.insert(post).await?)
    }

    /// Validate and persist a batch. One bad item rejects the whole batch
    /// before anything touches the repository.
    pub async fn create_many(&self, batch: Vec<NewPost>) -> Result<Vec<Post>, ServiceError> {
        if batch.is_empty() {
            return Err(
                DomainError::Validation("batch must contain at least one post".into()).into(),
            );
        }
        let posts = batch
            .into_iter()
            .map(NewPost::into_post)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.posts.insert_many(posts).await?)
    }

    /// Apply a partial update to an existing post.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Post, ServiceError> {
        patch.validate()?;
        self.posts
            .update(id, patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.posts.delete(id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: Uuid) -> ServiceError {
    DomainError::NotFound {
        entity_type: "post",
        id,
    }
    .into()
}
