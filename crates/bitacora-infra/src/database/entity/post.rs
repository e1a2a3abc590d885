//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use bitacora_core::domain::{Post, PostImage};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,
    pub tags: Vec<String>,
    // The three image columns are written together or not at all; the
    // domain type enforces this by carrying them as one Option.
    pub image_url: Option<String>,
    pub image_mime: Option<String>,
    pub image_name: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        let image = match (model.image_url, model.image_mime, model.image_name) {
            (Some(url), Some(mime), Some(original_name)) => Some(PostImage {
                url,
                mime,
                original_name,
            }),
            _ => None,
        };

        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            author: model.author,
            tags: model.tags,
            image,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        let (image_url, image_mime, image_name) = match post.image {
            Some(image) => (
                Some(image.url),
                Some(image.mime),
                Some(image.original_name),
            ),
            None => (None, None, None),
        };

        Self {
            id: Set(post.id),
            title: Set(post.title),
            content: Set(post.content),
            author: Set(post.author),
            tags: Set(post.tags),
            image_url: Set(image_url),
            image_mime: Set(image_mime),
            image_name: Set(image_name),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
