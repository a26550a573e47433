//! PostgreSQL catalog store.
//!
//! The hosted database owns the schema; this module is a thin pool wrapper
//! plus the handful of queries the site needs. Handlers depend on the
//! `CatalogStore` trait so tests can substitute a fake.

use crate::config::DatabaseSettings;
use crate::error::AppError;
use crate::models::{Collection, PriceCategory, PriceItem, Service, ServiceCategory};
use crate::services::metrics::DB_QUERY_DURATION;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a single entity's rank within its collection. Unknown ids are
    /// not an error; the caller asserts membership.
    async fn set_rank(&self, collection: Collection, id: &str, rank: i32) -> Result<(), AppError>;

    async fn list_price_categories(&self) -> Result<Vec<PriceCategory>, AppError>;
    async fn list_price_items(&self) -> Result<Vec<PriceItem>, AppError>;
    async fn list_service_categories(&self) -> Result<Vec<ServiceCategory>, AppError>;
    async fn list_services(&self) -> Result<Vec<Service>, AppError>;
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[instrument(skip(settings))]
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(&settings.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Apply the reference schema. Opt-in: the hosted database normally owns
    /// its schema and this is only run in dev/test environments.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for Database {
    #[instrument(skip(self), fields(table = collection.table_name()))]
    async fn set_rank(&self, collection: Collection, id: &str, rank: i32) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["set_rank"])
            .start_timer();

        // table_name() is a closed set of static strings, never caller input
        let query = format!(
            "UPDATE {} SET sort_order = $1 WHERE id = $2",
            collection.table_name()
        );

        sqlx::query(&query)
            .bind(rank)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to update rank in {}: {}",
                    collection.table_name(),
                    e
                ))
            })?;

        timer.observe_duration();

        Ok(())
    }

    async fn list_price_categories(&self) -> Result<Vec<PriceCategory>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_price_categories"])
            .start_timer();

        let categories = sqlx::query_as::<_, PriceCategory>(
            r#"
            SELECT id, title, description, sort_order, created_utc
            FROM price_categories
            ORDER BY sort_order, created_utc
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list price categories: {}", e))
        })?;

        timer.observe_duration();

        Ok(categories)
    }

    async fn list_price_items(&self) -> Result<Vec<PriceItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_price_items"])
            .start_timer();

        let items = sqlx::query_as::<_, PriceItem>(
            r#"
            SELECT id, category_id, name, price, sort_order, created_utc
            FROM price_items
            ORDER BY sort_order, created_utc
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list price items: {}", e))
        })?;

        timer.observe_duration();

        Ok(items)
    }

    async fn list_service_categories(&self) -> Result<Vec<ServiceCategory>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_service_categories"])
            .start_timer();

        let categories = sqlx::query_as::<_, ServiceCategory>(
            r#"
            SELECT id, title, sort_order, created_utc
            FROM service_categories
            ORDER BY sort_order, created_utc
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list service categories: {}", e))
        })?;

        timer.observe_duration();

        Ok(categories)
    }

    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_services"])
            .start_timer();

        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, category_id, title, description, image_key, sort_order, created_utc
            FROM services
            ORDER BY sort_order, created_utc
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list services: {}", e)))?;

        timer.observe_duration();

        Ok(services)
    }
}
