//! State manager implementation
//!
//! The flush is a whole-snapshot replace inside one transaction: a kill
//! at any moment leaves the store at either the previous snapshot or
//! the new one, never in between.

use crate::models::PackageRow;
use crate::transient::TransientState;
use garnet_errors::{Error, StateError};
use sqlx::{query, Pool, Row, Sqlite};
use std::path::{Path, PathBuf};

/// Persistent store for the installed, roots and reinstall sets
#[derive(Clone)]
pub struct StateManager {
    pool: Pool<Sqlite>,
    db_path: PathBuf,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl StateManager {
    /// Create a new state manager with database setup
    ///
    /// # Errors
    ///
    /// Returns an error if database setup, migrations, or directory
    /// creation fails.
    pub async fn new(base_path: &Path) -> Result<Self, Error> {
        tokio::fs::create_dir_all(base_path).await?;
        let db_path = base_path.join("state.sqlite");

        let pool = crate::create_pool(&db_path).await?;
        crate::run_migrations(&pool).await?;

        Ok(Self { pool, db_path })
    }

    /// Path of the backing database file
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Load the persisted snapshot into a [`TransientState`]
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored version
    /// string does not parse.
    pub async fn load(&self) -> Result<TransientState, Error> {
        let rows = query("SELECT name, version, root, reinstall, updated_at FROM packages")
            .fetch_all(&self.pool)
            .await?;

        let mut state = TransientState::new();
        for row in rows {
            let package_row = PackageRow {
                name: row.get("name"),
                version: row.get("version"),
                root: row.get::<i64, _>("root") != 0,
                reinstall: row.get::<i64, _>("reinstall") != 0,
                updated_at: row.get("updated_at"),
            };
            let id = package_row.package_id()?;
            state.installed.insert(id.clone());
            if package_row.root {
                state.installed_roots.insert(id.clone());
            }
            if package_row.reinstall {
                state.reinstall.insert(id);
            }
        }

        if !state.is_consistent() {
            return Err(StateError::Inconsistent {
                message: "installed_roots is not a subset of installed".to_string(),
            }
            .into());
        }

        Ok(state)
    }

    /// Replace the persisted snapshot with `state`, atomically
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails or the state violates
    /// the roots-subset invariant.
    pub async fn flush(&self, state: &TransientState) -> Result<(), Error> {
        if !state.is_consistent() {
            return Err(StateError::Inconsistent {
                message: "refusing to flush: installed_roots ⊄ installed".to_string(),
            }
            .into());
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        query("DELETE FROM packages").execute(&mut *tx).await?;

        for package in &state.installed {
            let root = i64::from(state.installed_roots.contains(package));
            let reinstall = i64::from(state.reinstall.contains(package));
            query(
                "INSERT INTO packages (name, version, root, reinstall, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&package.name)
            .bind(package.version.to_string())
            .bind(root)
            .bind(reinstall)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
