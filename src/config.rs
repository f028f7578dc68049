//! Configuration file handling for the budget home directory.
//!
//! The configuration file is stored at `$BUDGET_HOME/config.json`. The SQLite database lives next
//! to it as `budget.sqlite` unless `sqlite_path` says otherwise.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "budget";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const BUDGET_SQLITE: &str = "budget.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BUDGET_HOME` and from there it loads `$BUDGET_HOME/config.json` and opens the
/// database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the home directory, an initial `config.json` and a freshly migrated SQLite
    /// database.
    ///
    /// # Errors
    /// - Returns an error if `dir` already holds a config file or a database.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::create_inner(dir.into())
            .await
            .pub_result(ErrorType::Config)
    }

    /// This will
    /// - validate that `budget_home` and its config file exist
    /// - load the config file
    /// - open the database, migrating its schema if needed
    pub async fn load(budget_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(budget_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the budget home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let config_file = ConfigFile::default();
        let sqlite_path = config_file.sqlite_path(&root);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;
        config_file.save(&config_path).await?;
        debug!("Created budget home at {}", root.display());

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Budget home is missing, run 'budget init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = config_file.sqlite_path(&root);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget",
///   "config_version": 1,
///   "sqlite_path": "data/household.sqlite"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "budget"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the SQLite database (optional, relative to the home directory or absolute).
    /// Defaults to $BUDGET_HOME/budget.sqlite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sqlite_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sqlite_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads and validates a ConfigFile.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config file version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Returns the stored `sqlite_path` if it is absolute, otherwise resolves it against `root`.
    fn sqlite_path(&self, root: &Path) -> PathBuf {
        match &self.sqlite_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(BUDGET_SQLITE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("budget_home");

        let config = Config::create(&home).await.unwrap();
        assert!(config.config_path().is_file());
        assert!(config.sqlite_path().is_file());
        assert_eq!(config.sqlite_path(), config.root().join(BUDGET_SQLITE));
        drop(config);

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.config_file.config_version, CONFIG_VERSION);
        assert_eq!(config.db().categories().await.unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        let err = Config::create(dir.path()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nowhere")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("budget init"));
    }

    #[tokio::test]
    async fn test_config_custom_sqlite_path() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        Config::create(&home).await.unwrap();

        let moved = home.join("household.sqlite");
        std::fs::rename(home.join(BUDGET_SQLITE), &moved).unwrap();
        let json = r#"{ "app_name": "budget", "config_version": 1, "sqlite_path": "household.sqlite" }"#;
        utils::write(home.join(CONFIG_JSON), json).await.unwrap();

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.sqlite_path(), moved.canonicalize().unwrap());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let original = ConfigFile {
            sqlite_path: Some(PathBuf::from("/var/lib/budget.sqlite")),
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("sqlite_path"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "ledger", "config_version": 1 }"#;
        utils::write(&config_path, json).await.unwrap();

        let err = ConfigFile::load(&config_path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_newer_version() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "budget", "config_version": 9 }"#;
        utils::write(&config_path, json).await.unwrap();

        assert!(ConfigFile::load(&config_path).await.is_err());
    }
}
