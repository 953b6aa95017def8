// Entry point for the Minesweeper TUI application
// Sets up file logging, loads configuration and high scores, and launches the main UI

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};

// Module declarations
mod msw_board;      // Minefield grid and per-cell transitions
mod msw_color;      // Terminal-aware color palette
mod msw_config;     // TOML preferences and file locations
mod msw_difficulty; // Board presets and custom sizes
mod msw_score;      // Best-times table and its flat file
mod msw_session;    // One playthrough: clicks, clock, win/loss
mod msw_ui;         // Terminal UI rendering and event handling

use msw_config::{config_path, data_dir, load_or_create_config, save_config};
use msw_score::HighScoreTable;

const LOG_FILE_NAME: &str = "mswpr.log";

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    // Load or create user configuration (difficulty, custom board, preferences)
    let cfg_path = config_path();
    let mut cfg = load_or_create_config(&cfg_path);

    // High scores live in their own file and are saved after every change
    let mut scores = HighScoreTable::load(cfg.scores_path());
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let result = msw_ui::run(&mut cfg, &cfg_path, &mut scores);

    // Save current difficulty before exiting
    save_config(&cfg, &cfg_path);
    result
}

/// Log to a file in the data directory; the terminal belongs to the UI
/// Without a writable log file the game runs with logging disabled
fn init_logging() {
    let Some(dir) = data_dir() else { return };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
    else {
        return;
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();
}
