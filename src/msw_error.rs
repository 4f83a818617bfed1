// Error types for board setup and configuration persistence

use thiserror::Error;

/// Errors raised while setting up a board.
/// Gameplay itself never fails: hitting a mine is a normal outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Cannot place {requested} mines on a board of {cells} cells")]
    TooManyMines { requested: usize, cells: usize },
    #[error("Mines have already been placed on this board")]
    MinesAlreadyPlaced,
    #[error("Cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("Cell ({row}, {col}) was given more than one mine")]
    DuplicateMine { row: usize, col: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration directory available")]
    NoConfigDir,
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}
