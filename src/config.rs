use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::schema::{DEFAULT_CATEGORIES, DEFAULT_UNITS};

/// Contents of `stocktrack.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StockConfig {
    pub database: Option<String>,
    pub default_units: Option<Vec<String>>,
    pub default_categories: Option<Vec<String>>,
}

impl StockConfig {
    /// Config as written by `stocktrack init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(default_database_path().to_string_lossy().to_string()),
            default_units: Some(DEFAULT_UNITS.iter().map(|s| s.to_string()).collect()),
            default_categories: Some(DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path)
    }

    /// Units to seed, falling back to the built-in list
    pub fn seed_units(&self) -> Vec<String> {
        self.default_units
            .clone()
            .unwrap_or_else(|| DEFAULT_UNITS.iter().map(|s| s.to_string()).collect())
    }

    /// Categories to seed, falling back to the built-in list
    pub fn seed_categories(&self) -> Vec<String> {
        self.default_categories
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("stocktrack.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("data").join("stock_tracker.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StockConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StockConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StockConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocktrack.toml");

        let config = StockConfig::with_defaults();
        write_config(&path, &config, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), Some(config.clone()));

        assert!(write_config(&path, &config, false).is_err());
        assert!(write_config(&path, &config, true).is_ok());
    }

    #[test]
    fn test_partial_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocktrack.toml");
        std::fs::write(&path, "default_units = [\"tray\"]\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database_path(), default_database_path());
        assert_eq!(config.seed_units(), vec!["tray".to_string()]);
        assert_eq!(config.seed_categories().len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("stock.db");
        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }
}
