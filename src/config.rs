//! Persistent settings
//!
//! Read from `$HOME/.netshot-console/config.json`. A missing or unreadable
//! file means defaults; command line flags override individual fields.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON file holding the device groups; defaults to `groups.json` in
    /// the config directory
    pub inventory_path: Option<PathBuf>,
    /// Simulated round trip of every inventory call
    pub latency_ms: u64,
    /// Inventory calls fail as expired after this long without reconnecting
    pub session_timeout_secs: Option<u64>,
    pub tick_rate_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory_path: None,
            latency_ms: 300,
            session_timeout_secs: None,
            tick_rate_ms: 100,
            log_file: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".netshot-console"))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load the config at `path`, or the default location
    pub fn load(path: Option<&Path>) -> Config {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Config::default(),
            },
        };
        if !path.exists() {
            return Config::default();
        }

        let parsed: anyhow::Result<Config> = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|contents| Ok(serde_json::from_str(&contents)?));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    /// Save the config to `path`, creating its directory
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.inventory_path
            .clone()
            .or_else(|| Self::config_dir().map(|dir| dir.join("groups.json")))
            .unwrap_or_else(|| PathBuf::from("groups.json"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .or_else(|| Self::config_dir().map(|dir| dir.join("netshot-console.log")))
            .unwrap_or_else(|| PathBuf::from("netshot-console.log"))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            latency_ms: 0,
            session_timeout_secs: Some(60),
            inventory_path: Some(PathBuf::from("/tmp/groups.json")),
            ..Config::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(Some(&path));
        assert_eq!(loaded, config);
        assert_eq!(loaded.session_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(loaded.inventory_path(), PathBuf::from("/tmp/groups.json"));
    }

    #[test]
    fn test_partial_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{"latency_ms": 5}"#).unwrap();
        let config = Config::load(Some(&partial));
        assert_eq!(config.latency_ms, 5);
        assert_eq!(config.tick_rate_ms, 100);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        assert_eq!(Config::load(Some(&broken)), Config::default());
    }
}
