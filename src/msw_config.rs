// User preferences persisted as TOML, plus the on-disk locations the game uses
// The high-score table is kept in its own plain-text file, not in this config

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::msw_difficulty::{Difficulty, DifficultyError};
use crate::msw_score::SCORES_FILE_NAME;

const APP_NAME: &str = "mswpr";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("config file {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Selected board: a preset name or "Custom"
    pub difficulty: String,

    // Custom board parameters
    pub custom_rows: usize,
    pub custom_cols: usize,
    pub custom_mines: usize,

    pub player_name: String,       // Last name entered for a high score
    pub ascii_icons: bool,         // Use ASCII fallback icons
    pub pause_locks_board: bool,   // Ignore clicks while the clock is paused

    // Override for the high-score file location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores_file: Option<PathBuf>,

    // Fixed RNG seed, for replaying the same sequence of layouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: Difficulty::BEGINNER.name().to_string(),
            custom_rows: 20,
            custom_cols: 30,
            custom_mines: 120,
            player_name: String::new(),
            ascii_icons: false,
            pause_locks_board: false,
            scores_file: None,
            seed: None,
        }
    }
}

impl Config {
    /// Resolve the selected difficulty; a broken custom triple falls back to Beginner
    pub fn difficulty(&self) -> Difficulty {
        if let Some(preset) = Difficulty::from_name(&self.difficulty) {
            return preset;
        }
        match self.custom_difficulty() {
            Ok(custom) if self.difficulty == Difficulty::CUSTOM_NAME => custom,
            Ok(_) => {
                warn!(name = %self.difficulty, "unknown difficulty in config, using Beginner");
                Difficulty::BEGINNER
            }
            Err(err) => {
                warn!("invalid custom board in config ({err}), using Beginner");
                Difficulty::BEGINNER
            }
        }
    }

    pub fn custom_difficulty(&self) -> Result<Difficulty, DifficultyError> {
        Difficulty::custom(self.custom_rows, self.custom_cols, self.custom_mines)
    }

    /// Remember the chosen board; custom shapes are stored field by field
    pub fn set_difficulty(&mut self, d: &Difficulty) {
        self.difficulty = d.name().to_string();
        if !d.is_preset() {
            self.custom_rows = d.rows();
            self.custom_cols = d.cols();
            self.custom_mines = d.mines();
        }
    }

    /// Where the high-score file lives: explicit override, else the data directory
    pub fn scores_path(&self) -> PathBuf {
        self.scores_file
            .clone()
            .or_else(|| data_dir().map(|d| d.join(SCORES_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(SCORES_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string(self)?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, text).map_err(io_err)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "xhbl", APP_NAME)
}

/// Configuration file path (e.g. ~/.config/mswpr/mswpr.toml on Linux)
/// Falls back to the current directory if no home directory is known
pub fn config_path() -> PathBuf {
    let file = format!("{APP_NAME}.toml");
    match project_dirs() {
        Some(proj) => proj.config_dir().join(file),
        None => PathBuf::from(file),
    }
}

/// Per-user data directory for scores and logs
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.data_dir().to_path_buf())
}

/// Load configuration from `path`, writing defaults when the file does not exist
/// An unreadable or invalid file is left alone and defaults are used
pub fn load_or_create_config(path: &Path) -> Config {
    if !path.exists() {
        let cfg = Config::default();
        if let Err(err) = cfg.save(path) {
            warn!("{err}");
        }
        return cfg;
    }
    match Config::load(path) {
        Ok(cfg) => {
            debug!(path = %path.display(), "config loaded");
            cfg
        }
        Err(err) => {
            warn!("{err}; using defaults");
            Config::default()
        }
    }
}

/// Save configuration, logging instead of failing
pub fn save_config(cfg: &Config, path: &Path) {
    if let Err(err) = cfg.save(path) {
        warn!("{err}");
    }
}
