//! Composition services - the business operations the HTTP layer calls.
//! Pure domain logic over the ports; no framework or database types.

mod accounts;
mod posts;

pub use accounts::AccountService;
pub use posts::PostService;

use crate::error::{DomainError, RepoError};
use crate::ports::AuthError;

/// Failure of a service operation, preserving the originating layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}
