#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! State management for garnet
//!
//! This crate manages the `SQLite` database that tracks the installed
//! set, the user-requested roots and the reinstall markers, plus the
//! in-memory [`TransientState`] the apply engine mutates as actions
//! complete. The database is the source of truth: it is flushed after
//! each successful action so a crash at any point leaves it consistent
//! with the actions finished before the crash.

pub mod manager;
pub mod models;
pub mod transient;

pub use manager::StateManager;
pub use models::PackageRow;
pub use transient::TransientState;

use garnet_errors::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Create a new `SQLite` connection pool
///
/// # Errors
///
/// Returns an error if the database connection fails or configuration is invalid.
pub async fn create_pool(db_path: &Path) -> Result<Pool<Sqlite>, Error> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
            garnet_errors::StateError::DatabaseError {
                message: e.to_string(),
            }
            .into()
        })
}

/// Run database migrations
///
/// # Errors
///
/// Returns an error if any migration fails to execute.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        garnet_errors::StateError::MigrationFailed {
            message: e.to_string(),
        }
        .into()
    })
}
