//! Outfit repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use stylesense_core::logging::{COMPONENT, OPERATION, OUTFIT_ID, SUBSYSTEM};
use stylesense_core::{CreateOutfitRequest, Error, OutfitRecord, OutfitRepository, Result};

/// SQLite implementation of OutfitRepository.
///
/// The item id list is stored as a JSON array in a text column.
#[derive(Clone)]
pub struct SqliteOutfitRepository {
    pool: SqlitePool,
}

impl SqliteOutfitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutfitRepository for SqliteOutfitRepository {
    async fn create(&self, req: CreateOutfitRequest) -> Result<i64> {
        let items = serde_json::to_string(&req.items)?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO outfits (name, description, items, image_url, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&items)
        .bind(&req.image_url)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let id = result.last_insert_rowid();
        debug!(
            { SUBSYSTEM } = "database",
            { COMPONENT } = "outfits",
            { OPERATION } = "create",
            { OUTFIT_ID } = id,
            item_count = req.items.len(),
            "Outfit stored"
        );
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<OutfitRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, description, items, image_url, created_at
             FROM outfits
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut outfits = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.get("id");
            let raw_items: String = row.get("items");
            let items = serde_json::from_str(&raw_items).unwrap_or_else(|e| {
                warn!(
                    { SUBSYSTEM } = "database",
                    { COMPONENT } = "outfits",
                    { OUTFIT_ID } = id,
                    error = %e,
                    "Unreadable outfit item list, returning it empty"
                );
                Vec::new()
            });
            outfits.push(OutfitRecord {
                id,
                name: row.get("name"),
                description: row.get("description"),
                items,
                image_url: row.get("image_url"),
                created_at: row.get("created_at"),
            });
        }
        Ok(outfits)
    }
}
