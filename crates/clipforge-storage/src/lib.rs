//! Local filesystem artifact store.
//!
//! Every asset's backing file lives flat in one upload directory under a
//! unique stored name. The store hands out paths; it never serves bytes.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid stored name: {0}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Artifact store rooted at one upload directory.
#[derive(Clone, Debug)]
pub struct MediaStore {
    upload_dir: PathBuf,
}

impl MediaStore {
    /// Create the store, ensuring the upload directory exists.
    pub async fn new(upload_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let upload_dir = upload_dir.into();
        fs::create_dir_all(&upload_dir).await.map_err(|e| {
            StoreError::WriteFailed(format!(
                "Failed to create upload directory {}: {}",
                upload_dir.display(),
                e
            ))
        })?;
        Ok(MediaStore { upload_dir })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Generate a unique stored name for a new artifact, preserving the
    /// extension of the original name (lowercased).
    pub fn generate_stored_name(original_name: &str) -> String {
        let ext = original_name
            .rfind('.')
            .map(|i| original_name[i..].to_ascii_lowercase())
            .unwrap_or_default();
        format!(
            "{}-{}{}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            ext
        )
    }

    /// Generate a fresh output path inside the store for a given
    /// extension (with or without dot). Operations write here and never
    /// overwrite their input.
    pub fn generate_output_path(&self, extension: &str) -> PathBuf {
        let ext = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{}", extension)
        };
        self.upload_dir.join(format!(
            "{}-{}{}",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            ext
        ))
    }

    /// Resolve a stored name to its absolute path. Stored names are
    /// generated server-side, but names read back from the snapshot are
    /// still checked against traversal.
    pub fn resolve(&self, stored_name: &str) -> StoreResult<PathBuf> {
        if stored_name.contains("..")
            || stored_name.contains('/')
            || stored_name.contains('\\')
        {
            return Err(StoreError::InvalidName(stored_name.to_string()));
        }
        Ok(self.upload_dir.join(stored_name))
    }

    /// Write bytes to a fresh file under `stored_name`, fsyncing before
    /// returning so a registered asset always has durable backing bytes.
    pub async fn write(&self, stored_name: &str, data: &[u8]) -> StoreResult<PathBuf> {
        let path = self.resolve(stored_name)?;
        let mut file = fs::File::create(&path).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(data).await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StoreError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            "Stored artifact"
        );
        Ok(path)
    }

    pub async fn exists(&self, stored_name: &str) -> StoreResult<bool> {
        let path = self.resolve(stored_name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    pub async fn file_size(&self, stored_name: &str) -> StoreResult<u64> {
        let path = self.resolve(stored_name)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|_| StoreError::NotFound(stored_name.to_string()))?;
        Ok(meta.len())
    }

    /// Delete a stored file. A missing file is not an error: the record
    /// is already gone and a crash between record removal and file
    /// deletion must not wedge subsequent deletes.
    pub async fn delete(&self, stored_name: &str) -> StoreResult<()> {
        let path = self.resolve(stored_name)?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            tracing::warn!(path = %path.display(), "Delete requested for missing file");
            return Ok(());
        }
        fs::remove_file(&path).await?;
        tracing::info!(path = %path.display(), "Deleted artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_resolve_roundtrip() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path()).await.unwrap();

        let name = MediaStore::generate_stored_name("Clip.MP4");
        assert!(name.ends_with(".mp4"));

        let path = store.write(&name, b"bytes").await.unwrap();
        assert_eq!(path, store.resolve(&name).unwrap());
        assert!(store.exists(&name).await.unwrap());
        assert_eq!(store.file_size(&name).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_stored_names_are_unique() {
        let a = MediaStore::generate_stored_name("a.mp4");
        let b = MediaStore::generate_stored_name("a.mp4");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path()).await.unwrap();

        assert!(matches!(
            store.resolve("../etc/passwd"),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.resolve("nested/name.mp4"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path()).await.unwrap();
        assert!(store.delete("never-existed.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_output_path_in_store() {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path()).await.unwrap();
        let path = store.generate_output_path("webm");
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().unwrap(), "webm");
    }
}
