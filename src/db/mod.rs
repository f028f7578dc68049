//! This module is responsible for reading, writing and managing the SQLite database.

mod budget;
mod migrations;
mod payroll;

use crate::error::Res;
use crate::model::Amount;
use anyhow::{bail, Context};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that there is a SQLite file at `path`
    /// - Creates a SQLite client
    /// - Updates the database schema with migrations if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The SQLite database is missing '{}'", path.display());
        }
        let pool = connect(path, false).await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A file already exists at '{}'", path.display());
        }
        let pool = connect(path, true).await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Res<()> {
        migrations::bootstrap(&self.pool).await?;
        let current = migrations::current_version(&self.pool).await?;
        if current > migrations::CURRENT_VERSION {
            bail!(
                "The database schema version {current} is newer than this program supports ({})",
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&self.pool, current, migrations::CURRENT_VERSION).await
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn connect(path: &Path, create: bool) -> Res<SqlitePool> {
    debug!("Opening SQLite database at {}", path.display());
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .context("Failed to parse SQLite connection string")?
        .create_if_missing(create)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open SQLite database at {}", path.display()))
}

/// Reads a currency column stored as decimal text.
fn amount(row: &SqliteRow, column: &str) -> Res<Amount> {
    let text: String = row
        .try_get(column)
        .with_context(|| format!("Failed to read column '{column}'"))?;
    Amount::from_str(&text).with_context(|| format!("Invalid amount '{text}' in '{column}'"))
}

/// Reads a nullable currency column stored as decimal text.
fn optional_amount(row: &SqliteRow, column: &str) -> Res<Option<Amount>> {
    let text: Option<String> = row
        .try_get(column)
        .with_context(|| format!("Failed to read column '{column}'"))?;
    text.map(|text| {
        Amount::from_str(&text).with_context(|| format!("Invalid amount '{text}' in '{column}'"))
    })
    .transpose()
}
