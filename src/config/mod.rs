//! Bootstrap configuration file.
//!
//! The file only seeds the first connection: once a settings row exists in
//! the read-of-record database it takes precedence for target configuration.

use crate::errors::{AppError, AppResult};
use crate::models::target::{TargetConfig, TargetKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl TargetEntry {
    fn into_target(self, key: TargetKey) -> TargetConfig {
        TargetConfig {
            key,
            host: self.host,
            port: self.port,
            user: self.user,
            secret: self.secret,
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory where relative database locations are resolved.
    pub data_dir: String,
    /// Which target serves reads when both are configured.
    #[serde(default = "default_primary_target")]
    pub primary_target: String,
    pub primary: TargetEntry,
    #[serde(default = "default_secondary")]
    pub secondary: TargetEntry,
}

fn default_primary_target() -> String {
    "primary".to_string()
}

fn default_secondary() -> TargetEntry {
    TargetEntry {
        host: None,
        port: None,
        user: None,
        secret: None,
        active: false,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::config_dir().to_string_lossy().to_string(),
            primary_target: default_primary_target(),
            primary: TargetEntry {
                host: Some("shopclock_primary.sqlite".to_string()),
                port: None,
                user: None,
                secret: None,
                active: true,
            },
            secondary: default_secondary(),
        }
    }
}

impl Config {
    /// Standard configuration directory depending on the platform.
    pub fn config_dir() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(".shopclock"),
            None => PathBuf::from(".shopclock"),
        }
    }

    /// Full path of the config file.
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("shopclock.conf")
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            serde_yaml::from_str(&content).map_err(|_| AppError::ConfigLoad)
        } else {
            Ok(Config::default())
        }
    }

    /// The two bootstrap targets, primary first.
    pub fn targets(&self) -> (TargetConfig, TargetConfig) {
        (
            self.primary.clone().into_target(TargetKey::Primary),
            self.secondary.clone().into_target(TargetKey::Secondary),
        )
    }

    pub fn designated_primary(&self) -> TargetKey {
        TargetKey::from_str(&self.primary_target).unwrap_or(TargetKey::Primary)
    }

    /// Initialize configuration directory and file.
    ///
    /// In test mode the config file is left untouched so parallel test runs
    /// never race on the shared home directory.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let mut config = Config::default();
        if let Some(db) = custom_db {
            config.primary.host = Some(db.to_string());
        }

        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        Ok(config)
    }
}
