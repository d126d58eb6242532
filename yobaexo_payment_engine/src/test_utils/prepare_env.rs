use log::*;

use crate::SqliteDatabase;

/// Loads `.env.test`, initialises logging and returns a migrated database at `url`.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

/// A fresh, migrated in-memory database. Every call returns an independent database.
pub async fn memory_database() -> SqliteDatabase {
    prepare_test_env("sqlite::memory:").await
}
