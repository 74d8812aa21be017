//! Image store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// A binary image handed to the store.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// Original file name, used for its extension
    pub file_name: String,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }
}

/// Storage interface for uploaded images.
///
/// The engine records only the opaque reference returned by `save`;
/// callers absorb failures so a broken store never blocks a lifecycle
/// write.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image and return a stable reference to it.
    async fn save(&self, upload: ImageUpload) -> DomainResult<String>;

    /// Public URL for a stored reference.
    fn resolve_url(&self, image_ref: &str) -> String;

    /// Remove a stored image. Best-effort; missing files are not an error.
    async fn delete(&self, image_ref: &str) -> DomainResult<()>;
}
