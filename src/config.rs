//! Runtime configuration: defaults, optional TOML file, environment overrides

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::{Result, VendError};

/// Default vending API host
pub const DEFAULT_BASE_URL: &str = "https://liveamcore1.waferlock.com:10001";
/// Project used by the login form when none is given
pub const DEFAULT_PROJECT_ID: &str = "WFLK_CTSP";
/// Maximum events requested per range query
pub const DEFAULT_EVENT_COUNT: u32 = 2000;

/// Config file name looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "vendtrack.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub project_id: String,
    pub event_count: u32,
    /// Request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "vendtrack=debug"
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            event_count: DEFAULT_EVENT_COUNT,
            timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load from the first config file found, then apply `VENDTRACK_*` env vars
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Config file `load` reads, if any
    pub fn locate() -> Option<PathBuf> {
        first_existing(Self::candidate_paths())
    }

    /// `./vendtrack.toml`, then `~/.vendtrack/config.toml`
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = data_dir() {
            paths.push(dir.join("config.toml"));
        }
        paths
    }

    /// Parse a TOML file; absent keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| VendError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VENDTRACK_BASE_URL") {
            self.api.base_url = val;
        }
        if let Some(val) = lookup("VENDTRACK_PROJECT_ID") {
            self.api.project_id = val;
        }
        if let Some(val) = lookup("VENDTRACK_EVENT_COUNT") {
            self.api.event_count = parse_var("VENDTRACK_EVENT_COUNT", &val)?;
        }
        if let Some(val) = lookup("VENDTRACK_TIMEOUT_SECS") {
            self.api.timeout_secs = Some(parse_var("VENDTRACK_TIMEOUT_SECS", &val)?);
        }
        if let Some(val) = lookup("VENDTRACK_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("VENDTRACK_LOG_FORMAT") {
            self.logging.format = val;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(VendError::Config("api.base_url must not be empty".into()));
        }
        if self.api.event_count == 0 {
            return Err(VendError::Config("api.event_count must be at least 1".into()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(VendError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// `~/.vendtrack`, holding the user config file and TUI logs
pub fn data_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".vendtrack"))
}

fn first_existing(paths: Vec<PathBuf>) -> Option<PathBuf> {
    paths.into_iter().find(|p| p.is_file())
}

fn parse_var<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.trim()
        .parse()
        .map_err(|_| VendError::Config(format!("invalid {}: {:?}", key, val)))
}
