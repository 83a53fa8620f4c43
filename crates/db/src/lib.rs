//! Persistence for the partner roster.
//!
//! - [`store`]: the [`PartnerStore`] and [`CredentialStore`] collaborator
//!   traits and their MySQL implementations.
//! - [`workbook`]: the legacy spreadsheet-file partner store.
//! - [`repositories`]: SQL for the `parceiros_jwm` and `usuarios_app` tables.

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;
pub mod store;
pub mod workbook;

pub use error::StoreError;
pub use store::{
    Credential, CredentialStore, MySqlCredentialStore, MySqlPartnerStore, PartnerStore,
    StaticCredentialStore,
};
pub use workbook::WorkbookPartnerStore;

pub type DbPool = sqlx::MySqlPool;

/// Seconds to wait for a free connection before failing a request.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the bundled migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
