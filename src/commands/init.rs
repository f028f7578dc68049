use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the budget home directory with an initial `config.json` and an empty, migrated SQLite
/// database.
///
/// # Arguments
/// - `budget_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/budget`. It is created if it does not exist.
///
/// # Errors
/// - Returns an error if the directory already holds a budget config or database.
/// - Returns an error if any file operations fail.
pub async fn init(budget_home: &Path) -> Result<Out<()>> {
    let config = Config::create(budget_home).await?;
    Ok(format!(
        "Successfully created the budget home at {}\n  config:   {}\n  database: {}",
        config.root().display(),
        config.config_path().display(),
        config.sqlite_path().display()
    )
    .into())
}
