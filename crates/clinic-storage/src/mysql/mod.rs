//! MySQL store.
//!
//! Queries are plain `sqlx::query` strings decoded column by column with
//! `Row::try_get`. Status and slot columns are `VARCHAR` and parsed through
//! the domain `FromStr` impls; an unparseable value surfaces as
//! [`Error::Corrupt`](crate::Error::Corrupt).
//!
//! Booking, moving an appointment, enqueueing and completing a queue entry
//! run inside a transaction. Booking and moving lock the target schedule row
//! with `SELECT ... FOR UPDATE` before counting, so two concurrent requests
//! for the last place serialize on that row.

mod accounts;
mod catalog;
mod content;
mod rows;
mod scheduling;

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use clinic_core::config::DatabaseConfig;

use crate::error::Result;
use crate::traits::ClinicStore;

/// Store backed by a MySQL connection pool.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Opens a pool against `config.url`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        tracing::info!(
            max_connections = config.max_connections,
            "Connected to MySQL"
        );
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

impl ClinicStore for MySqlStore {
    fn backend(&self) -> &'static str {
        "mysql"
    }
}
