/// SQLite-backed item store
///
/// Uses runtime queries instead of compile-time macros to avoid needing
/// DATABASE_URL during compilation.
use crate::{
    error::ServiceResult,
    item_store::{not_found, Item, ItemStore},
};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Durable item store backend
#[derive(Clone)]
pub struct SqliteItemStore {
    db: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn create(
        &self,
        name: &str,
        description: &str,
        photofile: Option<&str>,
    ) -> ServiceResult<Item> {
        let item = sqlx::query_as::<_, Item>(
            "INSERT INTO items (inventory_name, description, photofile)
             VALUES (?1, ?2, ?3)
             RETURNING id, inventory_name, description, photofile",
        )
        .bind(name)
        .bind(description)
        .bind(photofile)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    async fn get(&self, id: i64) -> ServiceResult<Item> {
        sqlx::query_as::<_, Item>(
            "SELECT id, inventory_name, description, photofile FROM items WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn list(&self) -> ServiceResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, inventory_name, description, photofile FROM items ORDER BY id ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> ServiceResult<Item> {
        // COALESCE retains the stored value for absent fields; the row
        // update and the existence check are one statement.
        sqlx::query_as::<_, Item>(
            "UPDATE items
             SET inventory_name = COALESCE(?2, inventory_name),
                 description = COALESCE(?3, description)
             WHERE id = ?1
             RETURNING id, inventory_name, description, photofile",
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn set_photo(&self, id: i64, photofile: Option<&str>) -> ServiceResult<Item> {
        sqlx::query_as::<_, Item>(
            "UPDATE items SET photofile = ?2 WHERE id = ?1
             RETURNING id, inventory_name, description, photofile",
        )
        .bind(id)
        .bind(photofile)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> ServiceResult<Item> {
        sqlx::query_as::<_, Item>(
            "DELETE FROM items WHERE id = ?1
             RETURNING id, inventory_name, description, photofile",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| not_found(id))
    }
}
