//! # stylesense-db
//!
//! SQLite persistence for stylesense: the Garment Store.
//!
//! This crate provides:
//! - Connection pool management
//! - Garment and outfit repository implementations
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use stylesense_db::{Database, GarmentRepository, CreateGarmentRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:stylesense.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let id = db.garments.create(CreateGarmentRequest {
//!         image_data: "data:image/jpeg;base64,...".to_string(),
//!         category: "top".to_string(),
//!         color: "navy".to_string(),
//!         tags: "casual, cotton".to_string(),
//!     }).await?;
//!
//!     println!("Stored garment {}", id);
//!     Ok(())
//! }
//! ```

pub mod garments;
pub mod outfits;
pub mod pool;

// Re-export core types
pub use stylesense_core::*;

pub use garments::SqliteGarmentRepository;
pub use outfits::SqliteOutfitRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    pub garments: SqliteGarmentRepository,
    pub outfits: SqliteOutfitRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            garments: SqliteGarmentRepository::new(pool.clone()),
            outfits: SqliteOutfitRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Fresh, migrated in-memory database. Used by tests across the workspace.
    pub async fn connect_in_memory() -> Result<Self> {
        let db = Self::connect_with_config("sqlite::memory:", PoolConfig::in_memory()).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}
