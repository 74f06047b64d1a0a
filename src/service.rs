/// Inventory service
///
/// Orchestrates the item store and the asset store so that the lifecycle
/// invariants hold after every completed operation: a non-null photo
/// reference always resolves to exactly one blob, no blob is shared
/// between items, and a blob orphaned by replace or delete does not
/// outlive the operation. This is the only writer allowed to link or
/// unlink records and blobs.
use crate::{
    asset_store::AssetStore,
    error::{ServiceError, ServiceResult},
    item_store::{Item, ItemStore},
};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::warn;

/// An uploaded file: original filename plus buffered bytes
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Search result: the item plus an optional derived photo URL
#[derive(Debug, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

pub struct InventoryService {
    items: Arc<dyn ItemStore>,
    assets: Arc<AssetStore>,
    // Per-id serialization for the read-modify-write photo sequences.
    // Two concurrent replace/delete calls on the same id would otherwise
    // race between the record update and the blob cleanup.
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl InventoryService {
    pub fn new(items: Arc<dyn ItemStore>, assets: Arc<AssetStore>) -> Self {
        Self {
            items,
            assets,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn item_lock(&self, id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    /// Drop the map entry once no other task holds the lock, so the map
    /// only ever tracks ids with an operation in flight.
    fn release_item_lock(&self, id: i64, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // two strong refs left: the map's and ours
        if Arc::strong_count(lock) <= 2 {
            locks.remove(&id);
        }
    }

    /// Register a new item, storing its photo first if one was uploaded
    pub async fn register(
        &self,
        name: Option<&str>,
        description: Option<&str>,
        upload: Option<Upload>,
    ) -> ServiceResult<Item> {
        let name = match name {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ServiceError::Validation("no inventory_name".to_string())),
        };

        // Blob first: a storage failure here aborts before any record exists
        let photofile = match &upload {
            Some(upload) => Some(self.assets.store(&upload.data, &upload.filename).await?),
            None => None,
        };

        match self
            .items
            .create(name, description.unwrap_or(""), photofile.as_deref())
            .await
        {
            Ok(item) => Ok(item),
            Err(e) => {
                // Record creation failed after the blob write; remove the
                // now-orphaned blob so it does not outlive the operation.
                if let Some(reference) = &photofile {
                    if let Err(cleanup) = self.assets.remove(reference).await {
                        warn!(reference, error = %cleanup, "failed to clean up orphaned blob");
                    }
                }
                Err(e)
            }
        }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Item>> {
        self.items.list().await
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Item> {
        self.items.get(id).await
    }

    /// Update name and/or description; the photo is never touched here
    pub async fn update_metadata(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ServiceResult<Item> {
        self.items.update(id, name, description).await
    }

    /// Replace an item's photo: write-new, link, delete-old
    pub async fn replace_photo(&self, id: i64, upload: Upload) -> ServiceResult<Item> {
        let lock = self.item_lock(id);
        let guard = lock.lock().await;
        let result = self.replace_photo_locked(id, upload).await;
        drop(guard);
        self.release_item_lock(id, &lock);
        result
    }

    async fn replace_photo_locked(&self, id: i64, upload: Upload) -> ServiceResult<Item> {
        // Existence check before anything touches the medium; the upload
        // stays buffered in memory, so a missing item leaves no bytes behind.
        let previous = self.items.get(id).await?.photofile;

        let reference = self.assets.store(&upload.data, &upload.filename).await?;

        let item = match self.items.set_photo(id, Some(&reference)).await {
            Ok(item) => item,
            Err(e) => {
                // Unlink failed; the fresh blob is the orphan, not the old one
                if let Err(cleanup) = self.assets.remove(&reference).await {
                    warn!(reference, error = %cleanup, "failed to clean up orphaned blob");
                }
                return Err(e);
            }
        };

        // Only after the new blob is durably linked does the old one go.
        // A failure here leaves a recoverable orphan for out-of-band sweeping.
        if let Some(old) = previous {
            if let Err(e) = self.assets.remove(&old).await {
                warn!(reference = old, error = %e, "failed to remove replaced blob");
            }
        }

        Ok(item)
    }

    /// Read an item's photo bytes
    ///
    /// NotFound covers three cases the caller cannot tell apart here: no
    /// such item, item without a photo, and a reference whose file is
    /// missing from the medium.
    pub async fn photo(&self, id: i64) -> ServiceResult<(Vec<u8>, String)> {
        let item = self.items.get(id).await?;
        let reference = item
            .photofile
            .ok_or_else(|| ServiceError::NotFound("Photo not found".to_string()))?;
        let data = self.assets.read(&reference).await?;
        Ok((data, reference))
    }

    /// Delete an item and cascade-remove its blob
    pub async fn delete_item(&self, id: i64) -> ServiceResult<()> {
        let lock = self.item_lock(id);
        let guard = lock.lock().await;
        let result = self.delete_item_locked(id).await;
        drop(guard);
        self.release_item_lock(id, &lock);
        result
    }

    async fn delete_item_locked(&self, id: i64) -> ServiceResult<()> {
        let removed = self.items.delete(id).await?;
        if let Some(reference) = removed.photofile {
            // remove is idempotent; a missing blob is not an error. A
            // medium failure here leaves a recoverable orphan for the
            // out-of-band sweep, not a failed delete.
            if let Err(e) = self.assets.remove(&reference).await {
                warn!(reference, error = %e, "failed to remove blob of deleted item");
            }
        }

        Ok(())
    }

    /// Look up an item by id, optionally deriving its photo URL
    pub async fn search(
        &self,
        id: Option<i64>,
        include_photo: bool,
    ) -> ServiceResult<SearchResult> {
        let id = id.ok_or_else(|| ServiceError::Validation("no id".to_string()))?;
        let item = self.items.get(id).await?;

        let photo_url = if include_photo && item.photofile.is_some() {
            Some(format!("/inventory/{}/photo", id))
        } else {
            None
        };

        Ok(SearchResult { item, photo_url })
    }
}
