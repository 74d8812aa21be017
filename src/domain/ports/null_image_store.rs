//! Null image store implementation.
//!
//! Used when image storage is not configured but the type system
//! requires an ImageStore implementation.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

use super::image_store::{ImageStore, ImageUpload};

/// A no-op image store that keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct NullImageStore;

impl NullImageStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImageStore for NullImageStore {
    async fn save(&self, upload: ImageUpload) -> DomainResult<String> {
        Ok(format!("null://{}", upload.file_name))
    }

    fn resolve_url(&self, image_ref: &str) -> String {
        image_ref.to_string()
    }

    async fn delete(&self, _image_ref: &str) -> DomainResult<()> {
        Ok(())
    }
}
