// Configuration for the taskboard CLI
//
// Priority, highest first: CLI flags, environment (via clap `env`), the YAML
// config file, compiled defaults. A missing default config file is fine; an
// explicitly named one that does not exist is an error.

use crate::filter::Filter;
use crate::slot::DEFAULT_KEY;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "taskboard";
const CONFIG_FILE: &str = "config.yml";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// On-disk YAML shape; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    storage_key: Option<String>,
    log_level: Option<String>,
    default_filter: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub log_level: String,
    pub default_filter: Filter,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_KEY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            default_filter: Filter::All,
        }
    }
}

impl Config {
    /// Resolve the effective configuration
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Some(read_config_file(path)?)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Some(read_config_file(&path)?),
                _ => None,
            },
        };

        let mut config = match file {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };

        if let Some(dir) = &overrides.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(level) = &overrides.log_level {
            config.log_level = level.clone();
        }

        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let default_filter = match file.default_filter {
            Some(raw) => raw.parse::<Filter>().map_err(|e| eyre!("Invalid default_filter: {}", e))?,
            None => defaults.default_filter,
        };

        Ok(Self {
            data_dir: file.data_dir.map(expand_home).unwrap_or(defaults.data_dir),
            storage_key: file.storage_key.unwrap_or(defaults.storage_key),
            log_level: file.log_level.unwrap_or(defaults.log_level),
            default_filter,
        })
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    debug!(path = ?path, "Reading config file");
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn parse_config(text: &str) -> Result<ConfigFile> {
    if text.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// `<config_dir>/taskboard/config.yml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// `<data_dir>/taskboard`, or `.taskboard` under the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
}

fn expand_home(path: PathBuf) -> PathBuf {
    if let (Ok(rest), Some(home)) = (path.strip_prefix("~"), dirs::home_dir()) {
        return home.join(rest);
    }
    path
}
