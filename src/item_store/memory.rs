/// In-process item store
///
/// Holds records in a BTreeMap behind an async RwLock; the map's key order
/// gives `list` its ascending-id ordering for free. The id counter only
/// moves forward, so deleted ids are never reused. Nothing survives a
/// restart. The store is constructed once at startup and injected, never
/// reached through ambient state.
use crate::{
    error::ServiceResult,
    item_store::{not_found, Item, ItemStore},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    items: BTreeMap<i64, Item>,
    next_id: i64,
}

/// Transient item store backend
#[derive(Default)]
pub struct MemoryItemStore {
    state: RwLock<MemoryState>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn create(
        &self,
        name: &str,
        description: &str,
        photofile: Option<&str>,
    ) -> ServiceResult<Item> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let item = Item {
            id: state.next_id,
            inventory_name: name.to_string(),
            description: description.to_string(),
            photofile: photofile.map(String::from),
        };
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: i64) -> ServiceResult<Item> {
        self.state
            .read()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> ServiceResult<Vec<Item>> {
        Ok(self.state.read().await.items.values().cloned().collect())
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ServiceResult<Item> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&id).ok_or_else(|| not_found(id))?;
        if let Some(name) = name {
            item.inventory_name = name.to_string();
        }
        if let Some(description) = description {
            item.description = description.to_string();
        }
        Ok(item.clone())
    }

    async fn set_photo(&self, id: i64, photofile: Option<&str>) -> ServiceResult<Item> {
        let mut state = self.state.write().await;
        let item = state.items.get_mut(&id).ok_or_else(|| not_found(id))?;
        item.photofile = photofile.map(String::from);
        Ok(item.clone())
    }

    async fn delete(&self, id: i64) -> ServiceResult<Item> {
        self.state
            .write()
            .await
            .items
            .remove(&id)
            .ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_ascend_from_one() {
        let store = MemoryItemStore::new();
        let a = store.create("a", "", None).await.unwrap();
        let b = store.create("b", "", None).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_delete() {
        let store = MemoryItemStore::new();
        store.create("a", "", None).await.unwrap();
        let b = store.create("b", "", None).await.unwrap();
        store.delete(b.id).await.unwrap();

        let c = store.create("c", "", None).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_list_ordered_across_interleaved_deletes() {
        let store = MemoryItemStore::new();
        for name in ["a", "b", "c", "d"] {
            store.create(name, "", None).await.unwrap();
        }
        store.delete(2).await.unwrap();

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let store = MemoryItemStore::new();
        let item = store.create("Drill", "18V", Some("p.png")).await.unwrap();

        let updated = store.update(item.id, None, Some("20V")).await.unwrap();
        assert_eq!(updated.inventory_name, "Drill");
        assert_eq!(updated.description, "20V");
        assert_eq!(updated.photofile, Some("p.png".to_string()));
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_everywhere() {
        let store = MemoryItemStore::new();
        assert!(store.get(7).await.is_err());
        assert!(store.update(7, Some("x"), None).await.is_err());
        assert!(store.set_photo(7, None).await.is_err());
        assert!(store.delete(7).await.is_err());
    }
}
