//! `serve`, `migrate` and `seed-admin`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use clinic_api::AppState;
use clinic_core::ClinicConfig;
use clinic_storage::{ClinicStore, MemoryStore, MySqlStore};

/// Storage backend selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-process store; data is lost on exit
    Memory,
    /// MySQL, optionally migrating first
    MySql {
        /// Apply pending migrations before serving
        migrate: bool,
    },
}

/// Opens the store for `backend`.
pub async fn open_store(config: &ClinicConfig, backend: Backend) -> Result<Arc<dyn ClinicStore>> {
    match backend {
        Backend::Memory => {
            tracing::warn!("using the in-memory store, data will not persist");
            Ok(Arc::new(MemoryStore::new()))
        }
        Backend::MySql { migrate } => {
            let store = connect(config).await?;
            if migrate {
                store.migrate().await.context("failed to apply migrations")?;
            }
            Ok(Arc::new(store))
        }
    }
}

async fn connect(config: &ClinicConfig) -> Result<MySqlStore> {
    MySqlStore::connect(&config.database)
        .await
        .context("failed to connect to the database")
}

/// Builds state, creates the default admin and serves until shutdown.
pub async fn serve(config: ClinicConfig, backend: Backend) -> Result<()> {
    config.validate()?;
    let store = open_store(&config, backend).await?;
    let state = AppState::new(store, &config);
    clinic_api::bootstrap_admin(&state, &config.bootstrap)
        .await
        .context("failed to create the default admin")?;
    clinic_api::serve(state, &config.server)
        .await
        .context("server error")
}

/// Applies pending migrations.
pub async fn migrate(config: &ClinicConfig) -> Result<()> {
    connect(config)
        .await?
        .migrate()
        .await
        .context("failed to apply migrations")?;
    info!("database is up to date");
    Ok(())
}

/// Creates the configured admin when the `admins` table is empty.
pub async fn seed_admin(config: &ClinicConfig) -> Result<()> {
    let store: Arc<dyn ClinicStore> = Arc::new(connect(config).await?);
    seed_admin_into(store, config).await
}

async fn seed_admin_into(store: Arc<dyn ClinicStore>, config: &ClinicConfig) -> Result<()> {
    let state = AppState::new(store, config);
    clinic_api::bootstrap_admin(&state, &config.bootstrap)
        .await
        .context("failed to create the default admin")?;
    println!("Admin account ready: {}", config.bootstrap.admin_email);
    Ok(())
}
