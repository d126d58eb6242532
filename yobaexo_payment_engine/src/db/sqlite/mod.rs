//! # SQLite backend
//!
//! [`SqliteDatabase`] implements the storage traits on top of an `sqlx` SQLite pool. The query functions in
//! [`payments`] and [`users`] are plain functions that accept a `&mut SqliteConnection`, so callers can run them
//! against a pooled connection or inside a transaction (pass `&mut *tx`) without any other changes.
mod errors;
mod sqlite_impl;

pub mod payments;
pub mod users;

use std::{env, path::Path, str::FromStr};

pub use errors::SqliteDatabaseError;
use log::info;
pub use sqlite_impl::SqliteDatabase;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/yobaexo.db";

pub fn db_url() -> String {
    let result = env::var("YOBA_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ YOBA_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file (and its parent directory) if it does not exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let filename = options.clone().get_filename();
    ensure_parent_dir(&filename)?;
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

fn ensure_parent_dir(path: &Path) -> Result<(), SqliteDatabaseError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            info!("🗃️ Creating database directory {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| SqliteDatabaseError::DriverError(sqlx::Error::Io(e)))
        },
        _ => Ok(()),
    }
}
