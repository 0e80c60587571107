//! Asset Registry
//!
//! The single source of truth for asset metadata. An in-memory index
//! guarded by an `RwLock`, persisted as one JSON snapshot file that is
//! rewritten in full (via temp file + atomic rename) before any mutating
//! call returns. Mutations hold the write lock across
//! read-modify-persist, so concurrent pipeline runs serialize; reads only
//! take the read lock. There is no per-asset versioning: last patch wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use uuid::Uuid;

use clipforge_core::models::{Asset, AssetKind, AssetPatch};
use clipforge_core::{AppError, AppResult};
use clipforge_storage::MediaStore;

/// Input for registering a newly stored artifact.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub derived_from: Option<Uuid>,
}

pub struct AssetLibrary {
    snapshot_path: PathBuf,
    store: MediaStore,
    index: RwLock<HashMap<Uuid, Asset>>,
}

impl AssetLibrary {
    /// Load the persisted snapshot, or initialize an empty durable
    /// snapshot if none exists. A corrupt snapshot fails loudly: silently
    /// starting empty would orphan every stored file.
    pub async fn load(snapshot_path: impl Into<PathBuf>, store: MediaStore) -> AppResult<Self> {
        let snapshot_path = snapshot_path.into();
        if let Some(parent) = snapshot_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let index = if tokio::fs::try_exists(&snapshot_path).await.unwrap_or(false) {
            let raw = tokio::fs::read(&snapshot_path).await?;
            if raw.is_empty() {
                HashMap::new()
            } else {
                let assets: Vec<Asset> = serde_json::from_slice(&raw).map_err(|e| {
                    AppError::Internal(format!(
                        "Corrupt library snapshot {}: {}",
                        snapshot_path.display(),
                        e
                    ))
                })?;
                assets.into_iter().map(|a| (a.id, a)).collect()
            }
        } else {
            HashMap::new()
        };

        let library = AssetLibrary {
            snapshot_path,
            store,
            index: RwLock::new(index),
        };

        // Make sure an empty registry still has a durable snapshot.
        {
            let guard = library.index.read().await;
            library.persist(&guard).await?;
            tracing::info!(
                snapshot = %library.snapshot_path.display(),
                size = guard.len(),
                "Asset library initialised"
            );
        }

        Ok(library)
    }

    pub fn store(&self) -> &MediaStore {
        &self.store
    }

    /// Rewrite the full snapshot. Called with a lock held by every
    /// mutating operation before it returns success.
    async fn persist(&self, index: &HashMap<Uuid, Asset>) -> AppResult<()> {
        let assets: Vec<&Asset> = index.values().collect();
        let data = serde_json::to_vec_pretty(&assets)?;

        let tmp_path = self.snapshot_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &data).await?;
        tokio::fs::rename(&tmp_path, &self.snapshot_path).await?;
        Ok(())
    }

    /// Create and persist a new record. The backing file must already
    /// exist on the artifact store; its size is captured here.
    pub async fn register(&self, new_asset: NewAsset) -> AppResult<Asset> {
        if !self
            .store
            .exists(&new_asset.stored_name)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            return Err(AppError::Validation(format!(
                "Stored file {} does not exist",
                new_asset.stored_name
            )));
        }
        let size_bytes = self
            .store
            .file_size(&new_asset.stored_name)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let now = chrono::Utc::now();
        let asset = Asset {
            id: Uuid::new_v4(),
            original_name: new_asset.original_name,
            stored_name: new_asset.stored_name,
            kind: AssetKind::from_mime(&new_asset.mime_type),
            mime_type: new_asset.mime_type,
            size_bytes,
            created_at: now,
            updated_at: now,
            derived_from: new_asset.derived_from,
        };

        let mut index = self.index.write().await;
        index.insert(asset.id, asset.clone());
        self.persist(&index).await?;

        tracing::info!(
            asset_id = %asset.id,
            kind = ?asset.kind,
            stored_name = %asset.stored_name,
            "Registered asset"
        );
        Ok(asset)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Asset> {
        let index = self.index.read().await;
        index
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Full snapshot of all records; callers impose their own ordering.
    pub async fn list(&self) -> Vec<Asset> {
        let index = self.index.read().await;
        index.values().cloned().collect()
    }

    pub async fn patch(&self, id: Uuid, patch: AssetPatch) -> AppResult<Asset> {
        let mut index = self.index.write().await;
        let asset = index
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))?;

        if let Some(original_name) = patch.original_name {
            asset.original_name = original_name;
        }
        if let Some(mime_type) = patch.mime_type {
            asset.mime_type = mime_type;
        }
        asset.updated_at = chrono::Utc::now();

        let updated = asset.clone();
        self.persist(&index).await?;
        Ok(updated)
    }

    /// Delete the record (persisted first), then the backing file.
    /// Record-before-file ordering means a crash in between leaves an
    /// unreferenced file, never a record pointing at nothing; a missing
    /// file on delete is therefore non-fatal.
    pub async fn remove(&self, id: Uuid, delete_file: bool) -> AppResult<Asset> {
        let asset = {
            let mut index = self.index.write().await;
            let asset = index
                .remove(&id)
                .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))?;
            self.persist(&index).await?;
            asset
        };

        if delete_file {
            if let Err(e) = self.store.delete(&asset.stored_name).await {
                tracing::warn!(
                    asset_id = %id,
                    stored_name = %asset.stored_name,
                    error = %e,
                    "Failed to delete backing file"
                );
            }
        }

        tracing::info!(asset_id = %id, "Removed asset");
        Ok(asset)
    }

    /// Absolute path of an asset's backing file.
    pub async fn resolve_path(&self, id: Uuid) -> AppResult<PathBuf> {
        let asset = self.get(id).await?;
        self.store
            .resolve(&asset.stored_name)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    async fn library_with_store() -> (tempfile::TempDir, AssetLibrary) {
        let dir = tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("uploads")).await.unwrap();
        let library = AssetLibrary::load(dir.path().join("library.json"), store)
            .await
            .unwrap();
        (dir, library)
    }

    async fn stored_file(library: &AssetLibrary, name: &str) -> String {
        let stored_name = MediaStore::generate_stored_name(name);
        library.store().write(&stored_name, b"content").await.unwrap();
        stored_name
    }

    fn new_asset(original_name: &str, stored_name: &str, mime: &str) -> NewAsset {
        NewAsset {
            original_name: original_name.to_string(),
            stored_name: stored_name.to_string(),
            mime_type: mime.to_string(),
            derived_from: None,
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let (_dir, library) = library_with_store().await;
        let stored = stored_file(&library, "clip.mp4").await;

        let asset = library
            .register(new_asset("clip.mp4", &stored, "video/mp4"))
            .await
            .unwrap();
        assert_eq!(asset.kind, AssetKind::Video);
        assert_eq!(asset.size_bytes, 7);

        let fetched = library.get(asset.id).await.unwrap();
        assert_eq!(fetched.stored_name, stored);
    }

    #[tokio::test]
    async fn test_register_missing_file_is_validation_error() {
        let (_dir, library) = library_with_store().await;
        let result = library
            .register(new_asset("ghost.mp4", "no-such-file.mp4", "video/mp4"))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reload() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("library.json");
        let uploads = dir.path().join("uploads");

        let asset_id = {
            let store = MediaStore::new(&uploads).await.unwrap();
            let library = AssetLibrary::load(&snapshot, store).await.unwrap();
            let stored = stored_file(&library, "clip.mp4").await;
            library
                .register(new_asset("clip.mp4", &stored, "video/mp4"))
                .await
                .unwrap()
                .id
        };

        let store = MediaStore::new(&uploads).await.unwrap();
        let reloaded = AssetLibrary::load(&snapshot, store).await.unwrap();
        let asset = reloaded.get(asset_id).await.unwrap();
        assert_eq!(asset.original_name, "clip.mp4");
    }

    #[tokio::test]
    async fn test_patch_bumps_updated_at() {
        let (_dir, library) = library_with_store().await;
        let stored = stored_file(&library, "clip.mp4").await;
        let asset = library
            .register(new_asset("clip.mp4", &stored, "video/mp4"))
            .await
            .unwrap();

        let patched = library
            .patch(
                asset.id,
                AssetPatch {
                    original_name: Some("renamed.mp4".to_string()),
                    mime_type: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.original_name, "renamed.mp4");
        assert_eq!(patched.mime_type, "video/mp4");
        assert!(patched.updated_at >= asset.updated_at);
    }

    #[tokio::test]
    async fn test_patch_missing_is_not_found() {
        let (_dir, library) = library_with_store().await;
        let result = library.patch(Uuid::new_v4(), AssetPatch::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_deletes_record_and_file() {
        let (_dir, library) = library_with_store().await;
        let stored = stored_file(&library, "clip.mp4").await;
        let asset = library
            .register(new_asset("clip.mp4", &stored, "video/mp4"))
            .await
            .unwrap();

        library.remove(asset.id, true).await.unwrap();
        assert!(!library.store().exists(&stored).await.unwrap());

        // Both the lookup and a second remove report NotFound.
        assert!(matches!(
            library.get(asset.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            library.remove(asset.id, true).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_with_missing_file_is_non_fatal() {
        let (_dir, library) = library_with_store().await;
        let stored = stored_file(&library, "clip.mp4").await;
        let asset = library
            .register(new_asset("clip.mp4", &stored, "video/mp4"))
            .await
            .unwrap();

        library.store().delete(&stored).await.unwrap();
        assert!(library.remove(asset.id, true).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_registers_all_persist() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("library.json");
        let uploads = dir.path().join("uploads");
        let store = MediaStore::new(&uploads).await.unwrap();
        let library = Arc::new(AssetLibrary::load(&snapshot, store).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let library = Arc::clone(&library);
            handles.push(tokio::spawn(async move {
                let name = format!("clip-{}.mp4", i);
                let stored = MediaStore::generate_stored_name(&name);
                library.store().write(&stored, b"data").await.unwrap();
                library
                    .register(NewAsset {
                        original_name: name,
                        stored_name: stored,
                        mime_type: "video/mp4".to_string(),
                        derived_from: None,
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().id);
        }
        assert_eq!(ids.len(), 16);

        // Reload from disk: no write may be lost.
        let store = MediaStore::new(&uploads).await.unwrap();
        let reloaded = AssetLibrary::load(&snapshot, store).await.unwrap();
        assert_eq!(reloaded.list().await.len(), 16);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_fails_loudly() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("library.json");
        tokio::fs::write(&snapshot, b"{not json").await.unwrap();
        let store = MediaStore::new(dir.path().join("uploads")).await.unwrap();
        let result = AssetLibrary::load(&snapshot, store).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_resolve_path() {
        let (dir, library) = library_with_store().await;
        let stored = stored_file(&library, "clip.mp4").await;
        let asset = library
            .register(new_asset("clip.mp4", &stored, "video/mp4"))
            .await
            .unwrap();

        let path = library.resolve_path(asset.id).await.unwrap();
        assert_eq!(path, dir.path().join("uploads").join(&stored));
    }
}
