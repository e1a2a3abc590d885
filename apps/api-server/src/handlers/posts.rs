//! Post CRUD, search and upload handlers.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use bitacora_core::domain::{ImagePatch, NewPost, Post, PostPage, PostPatch, PostQuery};
use bitacora_core::ports::IncomingUpload;
use bitacora_shared::ApiResponse;
use bitacora_shared::dto::{CreatePostRequest, PostImageResponse, PostListResponse, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart body shared by create and update. All text fields are
/// optional here; create enforces its required fields through domain
/// validation so that a missing field and an empty one fail the same way.
#[derive(Debug, MultipartForm)]
pub struct PostForm {
    pub title: Option<Text<String>>,
    pub content: Option<Text<String>>,
    pub author: Option<Text<String>>,
    /// JSON array of strings, e.g. `["rust","blog"]`.
    pub tags: Option<Text<String>>,
    /// The image file part. Field name kept for client compatibility.
    pub imagen: Option<TempFile>,
    /// Clear-image flag; wins over a simultaneously uploaded file.
    pub borrar_imagen: Option<Text<bool>>,
}

/// Raw list parameters. Paging values are taken as strings so that
/// non-numeric input coerces to defaults instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
}

/// GET /posts?page&limit&q
pub async fn list(
    state: web::Data<AppState>,
    _identity: Identity,
    params: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let query = PostQuery::from_raw(
        params.q.as_deref(),
        params.page.as_deref(),
        params.limit.as_deref(),
    );

    let page = state.posts.list(&query).await?;

    Ok(HttpResponse::Ok().json(to_list_response(page)))
}

/// GET /posts/{id}
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// POST /posts (multipart)
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let tags = parse_tags(form.tags.as_ref())?;

    let mut input = NewPost {
        title: form.title.map(|t| t.0).unwrap_or_default(),
        content: form.content.map(|t| t.0).unwrap_or_default(),
        author: form.author.map(|t| t.0).unwrap_or_default(),
        tags: tags.unwrap_or_default(),
        image: None,
        created_at: None,
    };

    // Validate before touching storage so a rejected post never leaves an
    // orphaned upload on disk.
    input.validate().map_err(AppError::from)?;

    if let Some(file) = &form.imagen {
        input.image = Some(state.uploads.store(incoming(file)).await?);
    }

    let post = state.posts.create(input).await?;

    tracing::info!(post_id = %post.id, "created post");

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// POST /posts/many (JSON array body)
pub async fn create_many(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<Vec<CreatePostRequest>>,
) -> AppResult<HttpResponse> {
    let batch = body
        .into_inner()
        .into_iter()
        .map(|item| NewPost {
            title: item.title,
            content: item.content,
            author: item.author,
            tags: item.tags.unwrap_or_default(),
            image: None,
            created_at: item.created_at,
        })
        .collect();

    let posts = state.posts.create_many(batch).await?;

    tracing::info!(count = posts.len(), "created post batch");

    Ok(HttpResponse::Created().json(posts.into_iter().map(to_response).collect::<Vec<_>>()))
}

/// PUT /posts/{id} (multipart, partial update)
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let tags = parse_tags(form.tags.as_ref())?;
    let clear = form.borrar_imagen.as_ref().map(|flag| flag.0).unwrap_or(false);

    // An explicit clear wins over a new upload in the same request; the
    // uploaded file is not even stored in that case.
    let image = if clear {
        ImagePatch::Clear
    } else if let Some(file) = &form.imagen {
        ImagePatch::Set(state.uploads.store(incoming(file)).await?)
    } else {
        ImagePatch::Keep
    };

    let patch = PostPatch {
        title: form.title.map(|t| t.0),
        content: form.content.map(|t| t.0),
        author: form.author.map(|t| t.0),
        tags,
        image,
    };

    let post = state.posts.update(id, patch).await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    state.posts.delete(id).await?;

    tracing::info!(post_id = %id, "deleted post");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(id, "post deleted")))
}

/// The tags field arrives as one JSON-encoded text part; anything that is
/// not an array of strings is rejected rather than coerced.
fn parse_tags(field: Option<&Text<String>>) -> Result<Option<Vec<String>>, AppError> {
    match field {
        None => Ok(None),
        Some(raw) => serde_json::from_str::<Vec<String>>(&raw.0)
            .map(Some)
            .map_err(|_| AppError::BadRequest("tags must be a JSON array of strings".to_string())),
    }
}

fn incoming(file: &TempFile) -> IncomingUpload {
    IncomingUpload {
        temp_path: file.file.path().to_path_buf(),
        mime: file
            .content_type
            .as_ref()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        original_name: file
            .file_name
            .clone()
            .unwrap_or_else(|| "upload".to_string()),
        size: file.size as u64,
    }
}

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        author: post.author,
        tags: post.tags,
        image: post.image.map(|image| PostImageResponse {
            url: image.url,
            mime: image.mime,
            original_name: image.original_name,
        }),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn to_list_response(page: PostPage) -> PostListResponse {
    PostListResponse {
        items: page.items.into_iter().map(to_response).collect(),
        total: page.total,
        page: page.page,
        pages: page.pages,
    }
}
