//! Local durable store for annotation records and their stat aggregates.
//!
//! SQLite via sqlx: this tier is the strongly-consistent source of truth for
//! the read path and the fallback of last resort when no remote tier is
//! configured. Appends and stat updates run inside one transaction, so
//! concurrent writers cannot interleave or lose an increment.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::LocalStore;

/// Connection pool alias used across the workspace.
pub type DbPool = SqlitePool;

/// Open (creating if missing) the local database at `path`.
pub async fn create_pool(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .foreign_keys(true);

    // SQLite allows one writer at a time; a single pooled connection is the
    // store-scoped mutual exclusion that keeps concurrent append+stat
    // transactions (and the administrative wipe) from interleaving.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

/// In-memory pool for tests.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn create_memory_pool() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
