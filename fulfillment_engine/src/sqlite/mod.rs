//! SQLite backend for the fulfillment engine.
//!
//! [`SqliteDatabase`] implements the backend traits on top of the low-level functions in [`db`]. The schema
//! migrations in `migrations/` are embedded at compile time.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
