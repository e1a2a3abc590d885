//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use bitacora_core::domain::{ImagePatch, Post, PostPage, PostPatch, PostQuery, User};
use bitacora_core::error::RepoError;
use bitacora_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_write_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask the email so no PII lands in the logs.
        tracing::debug!(user_email = %mask_email(email), "finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let mut select = PostEntity::find();
        if let Some(q) = &query.q {
            select = select.filter(search_condition(q));
        }

        let paginator = select
            .order_by_desc(post::Column::CreatedAt)
            .paginate(self.db.as_ref(), query.limit);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let items = paginator
            .fetch_page(query.page - 1)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(PostPage::new(items, total, query))
    }

    async fn insert_many(&self, posts: Vec<Post>) -> Result<Vec<Post>, RepoError> {
        let models: Vec<post::ActiveModel> = posts.iter().cloned().map(Into::into).collect();

        // One multi-row INSERT: either every post lands or none does.
        PostEntity::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(map_write_err)?;

        Ok(posts)
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(content) = patch.content {
            active.content = Set(content);
        }
        if let Some(author) = patch.author {
            active.author = Set(author);
        }
        if let Some(tags) = patch.tags {
            active.tags = Set(tags);
        }
        match patch.image {
            ImagePatch::Keep => {}
            ImagePatch::Set(image) => {
                active.image_url = Set(Some(image.url));
                active.image_mime = Set(Some(image.mime));
                active.image_name = Set(Some(image.original_name));
            }
            ImagePatch::Clear => {
                active.image_url = Set(None);
                active.image_mime = Set(None);
                active.image_name = Set(None);
            }
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await.map_err(map_write_err)?;

        Ok(Some(updated.into()))
    }
}

/// Case-insensitive substring match ORed over title, content and tag
/// membership.
fn search_condition(q: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(q));

    Condition::any()
        .add(Expr::col((post::Entity, post::Column::Title)).ilike(pattern.clone()))
        .add(Expr::col((post::Entity, post::Column::Content)).ilike(pattern.clone()))
        .add(Expr::cust_with_values(
            "EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ?)",
            [pattern],
        ))
}

/// The filter is a literal substring search, so LIKE metacharacters in the
/// needle must not act as wildcards.
fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            if local.len() > 1 {
                format!("{}***{}", &local[..1], domain)
            } else {
                format!("***{domain}")
            }
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("blog"), "blog");
    }

    #[test]
    fn email_masking_keeps_only_first_character() {
        assert_eq!(mask_email("ana@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
