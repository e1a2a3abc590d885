//! Application state - shared across all handlers.

use std::sync::Arc;

use bitacora_core::ports::{TokenService, UploadStore};
use bitacora_core::service::{AccountService, PostService};
use bitacora_infra::{Argon2PasswordService, Database, DiskUploadStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state: the services handlers talk to.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub posts: Arc<PostService>,
    pub tokens: Arc<dyn TokenService>,
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    /// Wire the services to their concrete adapters. The database handle
    /// stays owned by the caller, which controls connect and teardown.
    pub async fn new(config: &AppConfig, db: &Database) -> std::io::Result<Self> {
        let uploads = DiskUploadStore::new(config.uploads.clone());
        uploads.init().await?;

        let users = Arc::new(db.users());
        let posts = Arc::new(db.posts());

        tracing::info!("application state initialized");

        Ok(Self {
            accounts: Arc::new(AccountService::new(
                users,
                Arc::new(Argon2PasswordService::new()),
            )),
            posts: Arc::new(PostService::new(posts)),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            uploads: Arc::new(uploads),
        })
    }
}
