//! Upload storage implementations.

mod disk;

pub use disk::{ALLOWED_MIME_TYPES, DEFAULT_MAX_BYTES, DiskUploadStore, UploadConfig};
