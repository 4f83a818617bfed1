// User preferences and their persistence as TOML
// Board size and mine count are fixed; only presentation and seeding live here

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::msw_error::ConfigError;

/// Persisted user configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ascii_icons: bool,    // Use ASCII fallback glyphs
    pub show_indicator: bool, // Show cursor position indicator
    pub seed: Option<u64>,    // Fixed mine layout seed (None = random each game)
    pub log_level: String,    // trace / debug / info / warn / error
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ascii_icons: false,
            show_indicator: false,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

/// Per-project directory holding the config and log files
/// Falls back to the current directory when ProjectDirs is unavailable
pub fn data_dir() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "mineswpr", "mineswpr") {
        return Some(proj.config_dir().to_path_buf());
    }
    env::current_dir().ok()
}

pub fn config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("mineswpr.toml"))
}

pub fn parse_config(s: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str::<Config>(s)?)
}

/// Read the config file; Ok(None) when it does not exist yet
pub fn load_config() -> Result<Option<Config>, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(&path)?;
    parse_config(&s).map(Some)
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    let s = toml::to_string(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, s)?;
    Ok(())
}

/// Load configuration from disk, or create the default file if not found
/// A broken file is left in place and defaults are used for this run
pub fn load_or_create_config() -> Config {
    match load_config() {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            let cfg = Config::default();
            if let Err(e) = save_config(&cfg) {
                warn!("could not write default config: {e}");
            }
            cfg
        }
        Err(e) => {
            warn!("could not load config, using defaults: {e}");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse_config("ascii_icons = true\nseed = 42\n").unwrap();
        assert!(cfg.ascii_icons);
        assert_eq!(cfg.seed, Some(42));
        assert!(!cfg.show_indicator);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn serialized_config_parses_back() {
        let cfg = Config {
            ascii_icons: true,
            show_indicator: true,
            seed: Some(7),
            log_level: "debug".to_string(),
        };
        let s = toml::to_string(&cfg).unwrap();
        assert_eq!(parse_config(&s).unwrap(), cfg);
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = parse_config("ascii_icons = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
