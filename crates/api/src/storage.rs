//! On-disk storage for survey images.
//!
//! Images arrive as data URLs, are decoded and written under
//! `<storage_dir>/images/<uuid>.<ext>`, and are served back by the static
//! `/images` route. Only the file name is stored in the database.

use std::path::{Path, PathBuf};

use uuid::Uuid;
use websurvey_core::data_url::{DataUrl, DataUrlError};

/// URL path segment (and subdirectory) images are served from.
pub const IMAGES_DIR: &str = "images";

/// Errors from the image store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid image: {0}")]
    InvalidImage(#[from] DataUrlError),

    #[error("invalid stored file name '{0}'")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes, deletes and addresses survey image files.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_base: String,
}

impl ImageStore {
    /// * `root` - storage root; images live in `root/images`.
    /// * `public_url` - externally visible server URL, e.g. `http://host:3000`.
    pub fn new(root: impl AsRef<Path>, public_url: &str) -> Self {
        Self {
            dir: root.as_ref().join(IMAGES_DIR),
            public_base: format!("{}/{IMAGES_DIR}", public_url.trim_end_matches('/')),
        }
    }

    /// Directory that holds the image files (served statically).
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode a data URL and write it to a fresh file. Returns the file name.
    pub async fn save_data_url(&self, data_url: &str) -> Result<String, StorageError> {
        let image = DataUrl::parse(data_url)?;
        let ext = image.image_extension()?;
        let name = format!("{}.{ext}", Uuid::new_v4());

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), image.data()).await?;

        tracing::debug!(file = %name, bytes = image.data().len(), "Stored survey image");
        Ok(name)
    }

    /// Remove a stored image. A file that is already gone is not an error.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(file = %name, "Deleted survey image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort delete used on cleanup paths; failures are only logged.
    pub async fn discard(&self, name: &str) {
        if let Err(e) = self.delete(name).await {
            tracing::warn!(file = %name, error = %e, "Failed to delete survey image");
        }
    }

    /// Absolute URL for a stored file name.
    pub fn public_url(&self, name: &str) -> String {
        format!("{}/{name}", self.public_base)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        let plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        if !plain {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use websurvey_core::data_url::fixtures::png_bytes;

    fn store(root: &Path) -> ImageStore {
        ImageStore::new(root, "http://localhost:3000/")
    }

    #[tokio::test]
    async fn save_writes_decoded_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let bytes = png_bytes(2048);

        let name = store
            .save_data_url(&DataUrl::new("image/png", bytes.clone()).encode())
            .await
            .unwrap();

        assert!(name.ends_with(".png"));
        let written = tokio::fs::read(tmp.path().join(IMAGES_DIR).join(&name))
            .await
            .unwrap();
        assert_eq!(written, bytes);
        assert_eq!(
            store.public_url(&name),
            format!("http://localhost:3000/images/{name}")
        );
    }

    #[tokio::test]
    async fn save_rejects_non_images() {
        let tmp = tempfile::tempdir().unwrap();
        let url = DataUrl::new("image/png", b"not a png".to_vec()).encode();
        assert_matches!(
            store(tmp.path()).save_data_url(&url).await,
            Err(StorageError::InvalidImage(_))
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let name = store
            .save_data_url(&DataUrl::new("image/png", png_bytes(64)).encode())
            .await
            .unwrap();

        store.delete(&name).await.unwrap();
        store.delete(&name).await.unwrap();
        assert!(!store.dir().join(&name).exists());
    }

    #[tokio::test]
    async fn delete_refuses_paths() {
        let tmp = tempfile::tempdir().unwrap();
        assert_matches!(
            store(tmp.path()).delete("../secrets.txt").await,
            Err(StorageError::InvalidName(_))
        );
    }
}
