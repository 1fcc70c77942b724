//! Layered configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables prefixed `DAILYDO_` (e.g. `DAILYDO_DATA_DIR`)
//! 2. `~/.config/dailydo/config.toml`
//! 3. Built-in defaults

use std::path::PathBuf;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::board::ImportPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the data files. Defaults to the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Log filter used when `DAILYDO_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Duplicate handling for `import` when no flag is given.
    #[serde(default)]
    pub import_policy: ImportPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
            import_policy: ImportPolicy::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        // DAILYDO_LOG is the log filter itself, not a config key.
        figment.merge(Env::prefixed("DAILYDO_").ignore(&["log"]))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dailydo").join("config.toml"))
    }

    /// Resolves the data directory.
    ///
    /// 1. `data_dir` from configuration.
    /// 2. `~/.local/share/dailydo` (on Linux).
    /// 3. `.` (fallback).
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|p| p.join("dailydo"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use figment::Jail;

    /// Points the platform config directory inside the jail.
    fn isolate_home(jail: &mut Jail) -> PathBuf {
        let root = jail.directory().to_path_buf();
        jail.set_env("HOME", root.display());
        jail.set_env("XDG_CONFIG_HOME", root.join("config").display());
        Config::global_config_path().expect("config dir")
    }

    #[test]
    fn defaults_are_correct() {
        let config = Config::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.import_policy, ImportPolicy::Skip);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            let path = isolate_home(jail);
            assert!(!path.exists());
            jail.set_env("DAILYDO_DATA_DIR", "/tmp/dailydo-test");
            jail.set_env("DAILYDO_IMPORT_POLICY", "replace");
            jail.set_env("DAILYDO_LOG", "trace");
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.data_dir(), PathBuf::from("/tmp/dailydo-test"));
            assert_eq!(config.import_policy, ImportPolicy::Replace);
            assert_eq!(config.log_level, "warn");
            Ok(())
        });
    }

    #[test]
    fn toml_sits_between_defaults_and_env() {
        Jail::expect_with(|jail| {
            let path = isolate_home(jail);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(
                &path,
                "data_dir = \"/from/toml\"\nlog_level = \"info\"\n",
            )
            .unwrap();

            let config: Config = Config::figment().extract()?;
            assert_eq!(config.data_dir, Some(PathBuf::from("/from/toml")));
            assert_eq!(config.log_level, "info");
            assert_eq!(config.import_policy, ImportPolicy::Skip);

            jail.set_env("DAILYDO_DATA_DIR", "/from/env");
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.data_dir, Some(PathBuf::from("/from/env")));
            assert_eq!(config.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn malformed_toml_is_an_error() {
        Jail::expect_with(|jail| {
            let path = isolate_home(jail);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "import_policy = \"sometimes\"\n").unwrap();
            assert!(Config::load().is_err());
            Ok(())
        });
    }
}
