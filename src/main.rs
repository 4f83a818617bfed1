// Entry point for the Minesweeper TUI application
// Loads preferences, sets up file logging and launches the main UI

use std::error::Error;

// Module declarations
mod msw_board;  // Board model and flood-fill reveal
mod msw_color;  // Terminal colour capability palette
mod msw_config; // User preferences persisted as TOML
mod msw_error;  // Error types
mod msw_game;   // Game controller and the GameView boundary
mod msw_log;    // File-backed tracing subscriber
mod msw_ui;     // Terminal UI rendering and event handling

use msw_config::{Config, load_or_create_config, parse_config};
use msw_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // Logging needs the configured level, so peek at the file before the
    // subscriber exists; load_or_create_config below reports any problems.
    let level = msw_config::config_path()
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|s| parse_config(&s).ok())
        .unwrap_or_else(Config::default)
        .log_level;
    if let Err(e) = msw_log::init(&level) {
        eprintln!("logging disabled: {e}");
    }

    let mut cfg = load_or_create_config();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    run_ui(&mut cfg)
}
