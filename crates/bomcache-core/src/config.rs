//! Application configuration management.
//!
//! The configuration holds the origin the worker caches assets from, an
//! optional cache directory override and the default log level. It is stored
//! at `~/.config/bomcache/config.json`; `BOMCACHE_ORIGIN` and
//! `BOMCACHE_CACHE_DIR` take precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bomcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Log filter used when neither `RUST_LOG` nor the config sets one
const DEFAULT_LOG_LEVEL: &str = "warn";

const ORIGIN_ENV: &str = "BOMCACHE_ORIGIN";
const CACHE_DIR_ENV: &str = "BOMCACHE_CACHE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub origin: Option<String>,
    pub cache_dir: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `info` or `bomcache_core=debug`
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// Load the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(
            std::env::var(ORIGIN_ENV).ok(),
            std::env::var(CACHE_DIR_ENV).ok(),
        );
        Ok(config)
    }

    /// Load only what the config file says, without environment overrides.
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn apply_overrides(&mut self, origin: Option<String>, cache_dir: Option<String>) {
        if let Some(origin) = origin.filter(|o| !o.is_empty()) {
            self.origin = Some(origin);
        }
        if let Some(dir) = cache_dir.filter(|d| !d.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Configured origin, or an error telling the user how to set one.
    pub fn origin(&self) -> Result<&str> {
        self.origin.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No origin configured. Run `bomcache config --origin <url>` or set {}",
                ORIGIN_ENV
            )
        })
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .filter(|level| !level.is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = Config {
            origin: Some("https://old.test/".to_string()),
            ..Config::default()
        };
        config.apply_overrides(Some("https://bom.test/".to_string()), Some("/tmp/bc".to_string()));
        assert_eq!(config.origin().unwrap(), "https://bom.test/");
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/bc"));
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let mut config = Config {
            origin: Some("https://bom.test/".to_string()),
            ..Config::default()
        };
        config.apply_overrides(Some(String::new()), None);
        assert_eq!(config.origin.as_deref(), Some("https://bom.test/"));
    }

    #[test]
    fn test_missing_origin_is_an_error() {
        let config = Config::default();
        let err = config.origin().unwrap_err();
        assert!(err.to_string().contains("BOMCACHE_ORIGIN"));
    }

    #[test]
    fn test_config_missing_fields_default_to_none() {
        let parsed: Config =
            serde_json::from_str(r#"{"origin":"https://bom.test/"}"#).expect("parse config");
        assert_eq!(parsed.origin.as_deref(), Some("https://bom.test/"));
        assert_eq!(parsed.cache_dir, None);
        assert_eq!(parsed.log_level, None);
        assert_eq!(parsed.log_level(), "warn");
    }

    #[test]
    fn test_log_level_from_file() {
        let parsed: Config =
            serde_json::from_str(r#"{"log_level":"bomcache_core=debug"}"#).expect("parse config");
        assert_eq!(parsed.log_level(), "bomcache_core=debug");

        let empty = Config {
            log_level: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(empty.log_level(), "warn");
    }

    #[test]
    fn test_file_load_ignores_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bomcache").join(CONFIG_FILE);
        let saved = Config {
            origin: Some("https://file.test/".to_string()),
            ..Config::default()
        };
        saved.save_to(&path).unwrap();

        std::env::set_var(CACHE_DIR_ENV, "/tmp/from-env");
        let loaded = Config::load_from(&path).unwrap();
        std::env::remove_var(CACHE_DIR_ENV);

        assert_eq!(loaded, saved);
        assert_eq!(loaded.cache_dir, None);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded, Config::default());
    }
}
