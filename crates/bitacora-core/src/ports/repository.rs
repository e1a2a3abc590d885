use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostPage, PostPatch, PostQuery, User};
use crate::error::RepoError;

/// Generic repository trait defining the CRUD operations shared by all
/// persisted entities.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity, returning it as persisted.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by ID. Returns whether a row existed and was removed.
    async fn delete(&self, id: ID) -> Result<bool, RepoError>;
}

/// User repository with credential lookup.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their (lowercase) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository: filtered/paginated reads plus batch and partial writes.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// List posts matching `query`, newest first, with pagination totals.
    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError>;

    /// Insert a batch in one statement. Either the whole batch is persisted
    /// and returned, or nothing is written.
    async fn insert_many(&self, posts: Vec<Post>) -> Result<Vec<Post>, RepoError>;

    /// Apply a partial update. `None` when no post has that id.
    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError>;
}
