//! Upload adapter port - turns an inbound file part into a stored asset.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::PostImage;

/// A file part received by the HTTP layer, spooled to a temporary path.
///
/// The temporary file stays owned by the transport layer and is removed
/// automatically when the request scope ends, so a failed store never
/// leaves partial uploads behind.
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    pub temp_path: PathBuf,
    /// Declared media type, e.g. `image/png`.
    pub mime: String,
    /// Filename as sent by the client, before sanitization.
    pub original_name: String,
    pub size: u64,
}

/// Storage for uploaded post images.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Validate and persist the upload under a collision-resistant name,
    /// returning the public reference for the stored asset.
    async fn store(&self, upload: IncomingUpload) -> Result<PostImage, UploadError>;
}

/// Upload boundary errors.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Upload storage failed: {0}")]
    Storage(String),
}
