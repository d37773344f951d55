//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! None of these functions begin or commit transactions themselves. Atomicity is the responsibility of the caller,
//! which is [`super::SqliteDatabase`] in practice.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod clients;
pub mod inventory;
pub mod ledger;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod receipts;
pub mod sequences;

const SQLITE_DB_URL: &str = "sqlite://data/fulfillment.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("OFP_DATABASE_URL").unwrap_or_else(|_| {
        info!("OFP_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Creates a new connection pool. The database file is created if it does not exist.
///
/// Connections use WAL journaling, enforce foreign keys, and wait up to [`BUSY_TIMEOUT`] for the write lock rather
/// than failing immediately when another writer is active.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
