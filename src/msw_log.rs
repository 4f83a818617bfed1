// File-backed tracing setup
// The terminal is owned by the UI, so log events go to a file next to the config

use std::error::Error;
use std::fs::{self, File};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::Level;

use crate::msw_config::data_dir;

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("mineswpr.log"))
}

/// Parse a level name, falling back to INFO for anything unknown
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// Install the global subscriber writing to the log file (truncated per run)
pub fn init(level: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = log_path().ok_or("no directory available for the log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(parse_level(level))
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;
    Ok(path)
}
