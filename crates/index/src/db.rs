//! SQLite sink for the final tables.
//!
//! The CSV tables are the source of truth. The database is a disposable copy
//! that is rebuilt from them on every load, so it runs with a single writer
//! connection and durability settings tuned for bulk inserts.

use exn::ResultExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::Repository;
use crate::assemble::Tables;
use crate::error::{ErrorKind, Result};
use crate::write::TableCounts;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// An open index database with its schema in place.
#[derive(Debug)]
pub struct Database {
    // Exactly one connection: loads are the only writer, and `:memory:`
    // databases live and die with their connection.
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file at `path` and bring its schema up
    /// to date.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(Self::load_options().filename(path.as_ref()).create_if_missing(true)).await
    }

    /// Open a private in-memory database.
    ///
    /// Not `#[cfg(test)]`, so other crates can use it in their tests.
    pub async fn open_in_memory() -> Result<Self> {
        Self::with_options(Self::load_options().filename(":memory:")).await
    }

    async fn with_options(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        MIGRATOR.run(&pool).await.or_raise(|| ErrorKind::Migration)?;
        Ok(Self { pool })
    }

    fn load_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("temp_store", "MEMORY")
            .pragma("cache_size", "-65536")
    }

    pub fn repository(&self) -> Repository {
        Repository::new(self.pool.clone())
    }

    /// Replace the stored index with `tables` and return what ended up stored.
    ///
    /// Fails with [`ErrorKind::InvalidData`] if the stored row counts differ
    /// from the tables that were loaded.
    pub async fn load(&self, tables: &Tables) -> Result<TableCounts> {
        let repo = self.repository();
        repo.replace_all(tables).await?;
        let stored = repo.counts().await?;
        if stored != tables.counts() {
            exn::bail!(ErrorKind::InvalidData("stored row counts"));
        }
        tracing::debug!(assets = stored.assets, frames = stored.animation_frames, "index loaded");
        Ok(stored)
    }

    /// Fold the write-ahead log back into the database file and close the
    /// connection.
    pub async fn close(self) -> Result<()> {
        let finished = async {
            sqlx::query("PRAGMA optimize").execute(&self.pool).await?;
            sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)").execute(&self.pool).await
        }
        .await;
        self.pool.close().await;
        finished.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}
