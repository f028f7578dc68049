//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`
//!
//! The current version lives in the single row of the `schema_version` table.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::error::Res;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

/// A database migration with up and down SQL.
struct Migration {
    /// The version this migration brings the database to (when going up).
    version: i32,
    /// SQL to execute when upgrading to this version.
    up_sql: &'static str,
    /// SQL to execute when downgrading from this version.
    down_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

/// Creates the `schema_version` table at version 0 if it does not exist yet.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Res<()> {
    sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
        .execute(pool)
        .await
        .context("Failed to create schema_version table")?;

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to read schema_version")?;
    if rows == 0 {
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(pool)
            .await
            .context("Failed to insert initial schema version")?;
    }
    Ok(())
}

/// Reads the schema version recorded in the database.
pub(crate) async fn current_version(pool: &SqlitePool) -> Res<i32> {
    let (version,): (i32,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to query schema version")?;
    Ok(version)
}

/// Runs migrations to bring the database from `current_ver` to `target_ver`.
///
/// - If `current_ver < target_ver`, runs "up" migrations sequentially.
/// - If `current_ver > target_ver`, runs "down" migrations sequentially.
/// - Each migration is executed within a transaction that includes the schema_version update.
///
/// Validates all required migrations exist before running any of them.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Res<()> {
    if current_ver == target_ver {
        debug!("Database already at target version {target_ver}, no migrations needed");
        return Ok(());
    }

    validate_migrations(current_ver, target_ver)?;

    if current_ver < target_ver {
        for version in (current_ver + 1)..=target_ver {
            let migration = find(version)?;
            debug!("Running migration {version:02} (up)");
            run_single_migration(pool, migration.up_sql, version).await?;
        }
    } else {
        for version in (target_ver + 1..=current_ver).rev() {
            let migration = find(version)?;
            debug!("Running migration {version:02} (down)");
            run_single_migration(pool, migration.down_sql, version - 1).await?;
        }
    }

    debug!("Migration complete, schema now at version {target_ver}");
    Ok(())
}

fn find(version: i32) -> Res<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))
}

/// Executes a single migration's SQL and updates schema_version, all within a transaction.
async fn run_single_migration(pool: &SqlitePool, sql: &str, new_version: i32) -> Res<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    // Supports multiple statements
    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Failed to clear schema_version")?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}

/// Validates that migrations are available for all versions needed to go from
/// `current_version` to `target_version`.
fn validate_migrations(current_version: i32, target_version: i32) -> Res<()> {
    let (start, end) = if current_version < target_version {
        (current_version + 1, target_version)
    } else {
        (target_version + 1, current_version)
    };

    for version in start..=end {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!(
                "Migration {version} is missing but required to migrate from version {current_version} to {target_version}"
            );
        }
    }

    Ok(())
}
