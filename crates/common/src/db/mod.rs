//! Database layer for Antiplagiat
//!
//! Provides:
//! - SeaORM entity models
//! - Repositories for submissions and detection reports
//! - Connection pool management with startup retries
//! - Schema bootstrap

pub mod models;
mod repository;

pub use repository::{NewDetectionReport, NewSubmissionRecord, ReportRepository, SubmissionRepository};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use backoff::{backoff::Constant, future::retry};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::time::Duration;
use tracing::{info, warn};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    primary: DatabaseConnection,
}

impl DbPool {
    /// Connect using configuration, retrying while the database comes up
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let max_attempts = config.connect_retries.max(1);
        let delay = Duration::from_secs(config.connect_retry_delay_secs);
        let mut attempt = 0;

        let primary = retry(Constant::new(delay), || {
            attempt += 1;
            let current = attempt;
            let opts = opts.clone();
            async move {
                Database::connect(opts).await.map_err(|e| {
                    warn!(
                        attempt = current,
                        max_attempts = max_attempts,
                        error = %e,
                        "Database connection attempt failed"
                    );
                    if current >= max_attempts {
                        backoff::Error::permanent(e)
                    } else {
                        backoff::Error::transient(e)
                    }
                })
            }
        })
        .await
        .map_err(|e| AppError::DatabaseConnection {
            message: format!("Failed to connect after {} attempts: {}", max_attempts, e),
        })?;

        info!("Database connection established");

        Ok(Self { primary })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }

    /// Create the entity's table and indexes when missing
    pub async fn ensure_schema<E: EntityTrait>(&self, entity: E) -> Result<()> {
        let backend = self.primary.get_database_backend();
        let schema = Schema::new(backend);

        let mut table = schema.create_table_from_entity(entity);
        table.if_not_exists();
        self.primary.execute(backend.build(&table)).await?;

        for mut index in schema.create_index_from_entity(entity) {
            index.if_not_exists();
            self.primary.execute(backend.build(&index)).await?;
        }

        info!(table = entity.table_name(), "Schema ensured");
        Ok(())
    }
}
