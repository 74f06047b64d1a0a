/// Item store
///
/// A keyed collection of inventory records behind one contract, with two
/// interchangeable backends: a durable SQLite variant and an in-process
/// variant whose state does not survive restart. Backend selection is a
/// configuration concern, not a behavioral one.
pub mod memory;
pub mod sqlite;

pub use memory::MemoryItemStore;
pub use sqlite::SqliteItemStore;

use crate::error::ServiceResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Inventory record
///
/// `photofile` holds the asset reference of the attached photo, if any.
/// The field name doubles as the database column and the JSON wire name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub inventory_name: String,
    pub description: String,
    pub photofile: Option<String>,
}

/// Contract shared by both item store backends.
///
/// Ids are allocated by the store, ascend in creation order, and are never
/// reused within a store's lifetime. `update` never touches `photofile`;
/// only `set_photo` does, and only the inventory service calls it.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Allocate the next unused id and store a new record
    async fn create(
        &self,
        name: &str,
        description: &str,
        photofile: Option<&str>,
    ) -> ServiceResult<Item>;

    /// Fetch a record by id
    async fn get(&self, id: i64) -> ServiceResult<Item>;

    /// All records, ascending by id; recomputed per call
    async fn list(&self) -> ServiceResult<Vec<Item>>;

    /// Replace only the provided fields, retaining the others
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ServiceResult<Item>;

    /// Set or clear the photo reference
    async fn set_photo(&self, id: i64, photofile: Option<&str>) -> ServiceResult<Item>;

    /// Remove a record, returning it so the caller can cascade-clean its blob
    async fn delete(&self, id: i64) -> ServiceResult<Item>;
}

pub(crate) fn not_found(id: i64) -> crate::error::ServiceError {
    crate::error::ServiceError::NotFound(format!("No item with id {}", id))
}
