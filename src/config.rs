use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use gdshim_include::LogLevel;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_PATH: &str = "gdshim.toml";
const CONFIG_PATH_ENV: &str = "GDSHIM_CONFIG";

static GLOBAL_CONFIG: LazyLock<Mutex<Config>> = LazyLock::new(|| Mutex::new(Config::default()));

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("Failed to read config file: {0}")]
    ReadConfig(std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            colored: true,
        }
    }
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: i32,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file into the global slot.
    pub fn initialize() -> Result<(), Error> {
        let config = load_config(&config_path())?;
        *GLOBAL_CONFIG.lock() = config;
        Ok(())
    }

    pub fn global<'a>() -> MutexGuard<'a, Config> {
        GLOBAL_CONFIG.lock()
    }

    pub fn from_toml_str(content: &str) -> Result<Config, Error> {
        let mut config: Config = toml::from_str(content)?;
        version_migration(&mut config);
        Ok(config)
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_PATH))
}

fn load_config(config_path: &Path) -> Result<Config, Error> {
    if !config_path.exists() {
        log::debug!("Config file not found, using default config.");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(config_path).map_err(Error::ReadConfig)?;
    Config::from_toml_str(&content)
}

fn version_migration(config: &mut Config) {
    if config.version != 1 {
        log::error!("Unsupported config version: {}", config.version);
    }
}
