//! Garment repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use stylesense_core::logging::{COMPONENT, GARMENT_ID, OPERATION, SUBSYSTEM};
use stylesense_core::{CreateGarmentRequest, Error, GarmentRecord, GarmentRepository, Result};

/// SQLite implementation of GarmentRepository.
#[derive(Clone)]
pub struct SqliteGarmentRepository {
    pool: SqlitePool,
}

impl SqliteGarmentRepository {
    /// Create a new SqliteGarmentRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_garment(row: SqliteRow) -> GarmentRecord {
    GarmentRecord {
        id: row.get("id"),
        image_data: row.get("image_data"),
        category: row.get("category"),
        color: row.get("color"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl GarmentRepository for SqliteGarmentRepository {
    async fn create(&self, req: CreateGarmentRequest) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO wardrobe (image_data, category, color, tags, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&req.image_data)
        .bind(&req.category)
        .bind(&req.color)
        .bind(&req.tags)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        let id = result.last_insert_rowid();
        debug!(
            { SUBSYSTEM } = "database",
            { COMPONENT } = "garments",
            { OPERATION } = "create",
            { GARMENT_ID } = id,
            category = %req.category,
            color = %req.color,
            "Garment stored"
        );
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<GarmentRecord>> {
        let rows = sqlx::query(
            "SELECT id, image_data, category, color, tags, created_at
             FROM wardrobe
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_garment).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<GarmentRecord>> {
        let row = sqlx::query(
            "SELECT id, image_data, category, color, tags, created_at
             FROM wardrobe
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_garment))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM wardrobe WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            { SUBSYSTEM } = "database",
            { COMPONENT } = "garments",
            { OPERATION } = "delete",
            { GARMENT_ID } = id,
            rows_affected = result.rows_affected(),
            "Garment delete"
        );
        Ok(())
    }
}
