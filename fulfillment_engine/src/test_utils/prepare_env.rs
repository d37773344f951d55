use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{traits::FulfillmentDatabase, SqliteDatabase};

/// Creates a fresh, fully migrated database at `url`, dropping any previous database at that location.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    create_database(url).await;
    run_migrations(url).await
}

/// A database URL in the system temp directory that is unique to this call.
pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/ofp_test_store_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
    db
}

pub async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("🚀️ Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("🚀️ Created Sqlite database {url}");
}

/// Closes the pool and deletes the database file.
pub async fn drop_database(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    let _ = db.close().await;
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Error dropping database {url}: {e:?}");
    }
}
