use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use bitacora_core::domain::{Post, PostPatch, User};
use bitacora_core::ports::{BaseRepository, PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: Uuid) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        author: "ana".to_owned(),
        tags: vec!["rust".to_owned()],
        image_url: Some("/uploads/1_cover.png".to_owned()),
        image_mime: Some("image/png".to_owned()),
        image_name: Some("cover.png".to_owned()),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn find_post_by_id_maps_image_columns() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id)]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    let image = post.image.unwrap();
    assert_eq!(image.url, "/uploads/1_cover.png");
    assert_eq!(image.mime, "image/png");
    assert_eq!(image.original_name, "cover.png");
}

#[tokio::test]
async fn partially_set_image_columns_map_to_no_image() {
    // A row that violates the all-or-nothing image invariant is surfaced
    // as having no image rather than a half-built one.
    let post_id = Uuid::new_v4();
    let mut model = post_model(post_id);
    model.image_mime = None;
    model.image_name = None;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert!(post.image.is_none());
}

#[tokio::test]
async fn find_user_by_email_maps_model() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            username: "ana_dev".to_owned(),
            email: "ana@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            bio: String::new(),
            avatar: "default.png".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();
    let repo = PostgresUserRepository::new(db);

    let result: Option<User> = repo.find_by_email("ana@example.com").await.unwrap();

    let user = result.unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.username, "ana_dev");
}

#[tokio::test]
async fn delete_reports_whether_a_row_existed() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let deleted: bool = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4())
        .await
        .unwrap();
    assert!(deleted);

    let deleted: bool = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4())
        .await
        .unwrap();
    assert!(!deleted);
}

#[tokio::test]
async fn update_of_missing_post_returns_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();
    let repo = PostgresPostRepository::new(db);

    let result = repo.update(Uuid::new_v4(), PostPatch::default()).await.unwrap();

    assert!(result.is_none());
}
