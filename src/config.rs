//! Configuration: optional `fortune.toml`, then environment overrides.
//!
//! | variable             | meaning                                   |
//! |----------------------|-------------------------------------------|
//! | `FORTUNE_DATABASE`   | path of the SQLite database file          |
//! | `FORTUNE_PORT`       | HTTP port for `serve`                     |
//! | `FORTUNE_UNIQUENESS` | `content-hash` or `raw-text`              |
//! | `APP_VERSION`        | version shown on the web page             |
//! | `APP_ENV`            | environment name shown on the web page    |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::fortune::UniquenessMode;

pub const DEFAULT_PORT: u16 = 8080;

/// Contents of `fortune.toml`; every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub uniqueness: Option<UniquenessMode>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct FortuneConfig {
    pub database: PathBuf,
    pub port: u16,
    pub uniqueness: UniquenessMode,
    pub app_version: Option<String>,
    pub app_env: Option<String>,
}

impl Default for FortuneConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            port: DEFAULT_PORT,
            uniqueness: UniquenessMode::default(),
            app_version: None,
            app_env: None,
        }
    }
}

impl FortuneConfig {
    /// Load `path` (or `fortune.toml`) if present, then apply the process environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = load_config(path)?.unwrap_or_default();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge file settings with variables returned by `env`.
    pub fn resolve<F>(file: FileConfig, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(database) = file.database {
            config.database = PathBuf::from(database);
        }
        if let Some(port) = file.port {
            config.port = port;
        }
        if let Some(mode) = file.uniqueness {
            config.uniqueness = mode;
        }

        if let Some(database) = env("FORTUNE_DATABASE").filter(|v| !v.trim().is_empty()) {
            config.database = PathBuf::from(database);
        }
        match env("FORTUNE_PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(
                    "FORTUNE_PORT '{}' is not a valid port, using {}",
                    raw,
                    config.port
                ),
            },
            None if file.port.is_none() => {
                tracing::debug!("Port is not defined, using default {}", config.port)
            }
            None => {}
        }
        if let Some(mode) = env("FORTUNE_UNIQUENESS") {
            config.uniqueness = mode.parse()?;
        }

        config.app_version = env("APP_VERSION");
        config.app_env = env("APP_ENV");
        Ok(config)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("fortune.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("fortunes.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<FileConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FileConfig = toml::from_str(&contents)?;
    Ok(Some(config))
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
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = FortuneConfig::resolve(FileConfig::default(), env_from(&[])).unwrap();
        assert_eq!(config, FortuneConfig::default());
    }

    #[test]
    fn test_missing_port_falls_back_quietly() {
        let (config, logs) = crate::test_logs::capture(tracing::Level::INFO, || {
            FortuneConfig::resolve(FileConfig::default(), env_from(&[])).unwrap()
        });
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!logs.contains("Port is not defined"), "logs: {}", logs);
    }

    #[test]
    fn test_invalid_port_still_warns() {
        let (config, logs) = crate::test_logs::capture(tracing::Level::WARN, || {
            FortuneConfig::resolve(FileConfig::default(), env_from(&[("FORTUNE_PORT", "http")])).unwrap()
        });
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(logs.contains("FORTUNE_PORT 'http' is not a valid port"), "logs: {}", logs);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            database: Some("from-file.db".to_string()),
            port: Some(9000),
            uniqueness: Some(UniquenessMode::RawText),
        };
        let env = env_from(&[
            ("FORTUNE_DATABASE", "/tmp/env.db"),
            ("FORTUNE_PORT", "9100"),
            ("FORTUNE_UNIQUENESS", "content-hash"),
            ("APP_VERSION", "1.2.3"),
            ("APP_ENV", "staging"),
        ]);

        let config = FortuneConfig::resolve(file, env).unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.port, 9100);
        assert_eq!(config.uniqueness, UniquenessMode::ContentHash);
        assert_eq!(config.app_version.as_deref(), Some("1.2.3"));
        assert_eq!(config.app_env.as_deref(), Some("staging"));
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        let file = FileConfig {
            port: Some(9000),
            ..FileConfig::default()
        };
        let config = FortuneConfig::resolve(file, env_from(&[("FORTUNE_PORT", "http")])).unwrap();
        assert_eq!(config.port, 9000);

        let config =
            FortuneConfig::resolve(FileConfig::default(), env_from(&[("FORTUNE_PORT", "99999")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_bad_uniqueness_is_error() {
        let result = FortuneConfig::resolve(
            FileConfig::default(),
            env_from(&[("FORTUNE_UNIQUENESS", "md5")]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fortune.toml");
        std::fs::write(&path, "database = \"data/f.db\"\nport = 3000\nuniqueness = \"raw-text\"\n").unwrap();

        let file = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(file.database.as_deref(), Some("data/f.db"));
        assert_eq!(file.port, Some(3000));
        assert_eq!(file.uniqueness, Some(UniquenessMode::RawText));

        assert!(load_config(Some(&dir.path().join("missing.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("a").join("b").join("fortunes.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
