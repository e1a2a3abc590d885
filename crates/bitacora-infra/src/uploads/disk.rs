//! Disk-backed upload store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use bitacora_core::domain::PostImage;
use bitacora_core::ports::{IncomingUpload, UploadError, UploadStore};

/// Media types accepted for post images.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Default upload cap: 5 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Settings for the disk store.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory the files are written to.
    pub dir: PathBuf,
    pub max_bytes: u64,
    /// URL prefix the stored files are served under.
    pub public_prefix: String,
}

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: DEFAULT_MAX_BYTES,
            public_prefix: "/uploads".to_string(),
        }
    }
}

/// Stores uploads on the local filesystem under timestamp-prefixed names.
pub struct DiskUploadStore {
    config: UploadConfig,
}

impl DiskUploadStore {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Create the storage directory if it does not exist yet.
    pub async fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config.dir).await
    }
}

#[async_trait]
impl UploadStore for DiskUploadStore {
    async fn store(&self, upload: IncomingUpload) -> Result<PostImage, UploadError> {
        if !ALLOWED_MIME_TYPES.contains(&upload.mime.as_str()) {
            return Err(UploadError::UnsupportedMediaType(upload.mime));
        }
        if upload.size > self.config.max_bytes {
            return Err(UploadError::PayloadTooLarge {
                size: upload.size,
                limit: self.config.max_bytes,
            });
        }

        let (stem, ext) = split_name(&upload.original_name);
        let millis = Utc::now().timestamp_millis();

        // The timestamp prefix makes names unique; create_new guarantees an
        // existing file is never overwritten even on a same-millisecond
        // collision, in which case a counter is bumped.
        let mut attempt = 0u32;
        let (name, mut dest) = loop {
            let name = if attempt == 0 {
                format!("{millis}_{stem}{ext}")
            } else {
                format!("{millis}_{attempt}_{stem}{ext}")
            };
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.config.dir.join(&name))
                .await
            {
                Ok(file) => break (name, file),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 16 => {
                    attempt += 1;
                }
                Err(e) => return Err(UploadError::Storage(e.to_string())),
            }
        };

        if let Err(e) = copy_into(&upload.temp_path, &mut dest).await {
            // Never leave a partial file behind.
            let _ = fs::remove_file(self.config.dir.join(&name)).await;
            return Err(UploadError::Storage(e.to_string()));
        }

        tracing::debug!(file = %name, mime = %upload.mime, "stored upload");

        Ok(PostImage {
            url: format!("{}/{}", self.config.public_prefix, name),
            mime: upload.mime,
            original_name: upload.original_name,
        })
    }
}

async fn copy_into(src: &Path, dest: &mut fs::File) -> std::io::Result<()> {
    let mut src = fs::File::open(src).await?;
    tokio::io::copy(&mut src, dest).await?;
    dest.flush().await
}

/// Sanitize the client filename into a (stem, extension) pair: any path
/// component is dropped, whitespace becomes `_`, the extension is
/// lowercased.
fn split_name(original: &str) -> (String, String) {
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let path = Path::new(&base);
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = stem
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_");

    let stem = if stem.is_empty() {
        "upload".to_string()
    } else {
        stem
    };
    (stem, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_in(dir: &Path, content: &[u8], name: &str, mime: &str) -> IncomingUpload {
        let temp_path = dir.join("incoming.tmp");
        std::fs::write(&temp_path, content).unwrap();
        IncomingUpload {
            temp_path,
            mime: mime.to_string(),
            original_name: name.to_string(),
            size: content.len() as u64,
        }
    }

    fn store_in(dir: &Path) -> DiskUploadStore {
        DiskUploadStore::new(UploadConfig::new(dir.join("uploads")))
    }

    #[tokio::test]
    async fn stores_under_timestamped_sanitized_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.init().await.unwrap();

        let image = store
            .store(upload_in(tmp.path(), b"png-bytes", "my cover.PNG", "image/png"))
            .await
            .unwrap();

        assert!(image.url.starts_with("/uploads/"));
        assert!(image.url.ends_with("_my_cover.png"), "got {}", image.url);
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.original_name, "my cover.PNG");

        let name = image.url.strip_prefix("/uploads/").unwrap();
        let written = std::fs::read(tmp.path().join("uploads").join(name)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn rejects_disallowed_mime() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.init().await.unwrap();

        let result = store
            .store(upload_in(tmp.path(), b"<svg/>", "pic.svg", "image/svg+xml"))
            .await;

        assert!(matches!(result, Err(UploadError::UnsupportedMediaType(_))));
    }

    #[tokio::test]
    async fn rejects_oversized_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = UploadConfig::new(tmp.path().join("uploads"));
        config.max_bytes = 4;
        let store = DiskUploadStore::new(config);
        store.init().await.unwrap();

        let result = store
            .store(upload_in(tmp.path(), b"12345", "big.png", "image/png"))
            .await;

        assert!(matches!(
            result,
            Err(UploadError::PayloadTooLarge { size: 5, limit: 4 })
        ));
    }

    #[tokio::test]
    async fn path_components_in_the_client_name_are_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(tmp.path());
        store.init().await.unwrap();

        let image = store
            .store(upload_in(tmp.path(), b"x", "../../etc/passwd.png", "image/png"))
            .await
            .unwrap();

        assert!(image.url.ends_with("_passwd.png"), "got {}", image.url);
        assert!(!image.url.contains(".."));
    }
}
