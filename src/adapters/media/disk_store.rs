//! Image store backed by a directory on local disk.
//!
//! Stored refs are bare file names generated here, never caller-supplied
//! paths, so refs can be embedded in rows and URLs without escaping.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{ImageStore, ImageUpload};

/// Image store that writes uploads under a configured root directory.
#[derive(Debug, Clone)]
pub struct DiskImageStore {
    root: PathBuf,
    base_url: String,
}

impl DiskImageStore {
    /// Create a store rooted at `root`, serving files under `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn storage_error(reason: impl Into<String>) -> DomainError {
        DomainError::Collaborator {
            name: "image-store".to_string(),
            reason: reason.into(),
        }
    }

    /// Pick a file extension from the upload, falling back to the
    /// content type when the file name carries none.
    fn extension_for(upload: &ImageUpload) -> String {
        let from_name = Path::new(&upload.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(char::is_alphanumeric));

        if let Some(ext) = from_name {
            return ext;
        }

        match upload.content_type.as_str() {
            "image/png" => "png".to_string(),
            "image/gif" => "gif".to_string(),
            "image/webp" => "webp".to_string(),
            _ => "jpg".to_string(),
        }
    }

    /// Refs are generated file names; anything path-like is not ours.
    fn is_safe_ref(image_ref: &str) -> bool {
        !image_ref.is_empty()
            && !image_ref.contains('/')
            && !image_ref.contains('\\')
            && !image_ref.starts_with('.')
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save(&self, upload: ImageUpload) -> DomainResult<String> {
        if upload.bytes.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Image payload is empty".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::storage_error(format!("failed to create image directory: {e}")))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), Self::extension_for(&upload));
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| Self::storage_error(format!("failed to write image: {e}")))?;

        Ok(file_name)
    }

    fn resolve_url(&self, image_ref: &str) -> String {
        format!("{}/{}", self.base_url, image_ref)
    }

    async fn delete(&self, image_ref: &str) -> DomainResult<()> {
        if !Self::is_safe_ref(image_ref) {
            return Ok(());
        }

        match tokio::fs::remove_file(self.root.join(image_ref)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_error(format!("failed to delete image: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &tempfile::TempDir) -> DiskImageStore {
        DiskImageStore::new(dir.path(), "/images")
    }

    #[tokio::test]
    async fn test_save_writes_bytes_and_returns_ref() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let upload = ImageUpload::new(vec![1, 2, 3], "banner.PNG", "image/png");
        let image_ref = store.save(upload).await.unwrap();

        assert!(image_ref.ends_with(".png"));
        let written = std::fs::read(dir.path().join(&image_ref)).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_extension_falls_back_to_content_type() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let upload = ImageUpload::new(vec![9], "photo", "image/webp");
        let image_ref = store.save(upload).await.unwrap();
        assert!(image_ref.ends_with(".webp"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_rejected() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let err = store
            .save(ImageUpload::new(Vec::new(), "x.jpg", "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_delete_is_best_effort() {
        let dir = tempdir().unwrap();
        let store = store(&dir);

        let image_ref = store
            .save(ImageUpload::new(vec![5], "a.jpg", "image/jpeg"))
            .await
            .unwrap();
        store.delete(&image_ref).await.unwrap();
        assert!(!dir.path().join(&image_ref).exists());

        // Missing files and path-shaped refs are quietly ignored.
        store.delete(&image_ref).await.unwrap();
        store.delete("../../etc/passwd").await.unwrap();
    }

    #[test]
    fn test_resolve_url_joins_base() {
        let dir = tempdir().unwrap();
        let store = DiskImageStore::new(dir.path(), "/images/");
        assert_eq!(store.resolve_url("abc.png"), "/images/abc.png");
    }
}
