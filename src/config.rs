use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR: &str = ".bakta-query";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub query: QueryConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub enable_cache: bool,
    /// Maximum cached pages before FIFO eviction
    pub cache_size: usize,
    /// Applied when a query gives no limit (None = unbounded)
    pub default_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Annotations per `save_annotations` call
    pub batch_size: usize,
    /// Parse and transform files on the rayon pool
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_size: 100,
            default_limit: None,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            parallel: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `~/.bakta-query/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::BaktaError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::BaktaError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::BaktaError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::BaktaError::Config(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// Explicit path, else the default location if it exists, else defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config, crate::BaktaError> {
    match explicit {
        Some(path) => load_config(path),
        None => match default_config_path() {
            Some(path) if path.exists() => load_config(path),
            _ => Ok(Config::default()),
        },
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), crate::BaktaError> {
        if self.import.batch_size == 0 {
            return Err(crate::BaktaError::Config(
                "import.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
