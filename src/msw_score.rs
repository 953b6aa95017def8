// Best completion time per preset difficulty, persisted as a flat text file
// Each line reads "<Difficulty>: <secs> seconds by <name>", the same text shown to the player

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::msw_difficulty::Difficulty;

/// Shown in place of the table when nothing has been recorded
pub const EMPTY_TABLE_TEXT: &str = "No high scores yet!";

/// Default file name inside the data directory
pub const SCORES_FILE_NAME: &str = "highscores.txt";

const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub name: String,
    pub secs: u32,
    pub difficulty: Difficulty,
}

impl HighScoreEntry {
    /// One rendered/persisted line, without the trailing newline
    pub fn line(&self) -> String {
        format!(
            "{:<13} {:<3} seconds by {}",
            format!("{}:", self.difficulty.name()),
            self.secs,
            self.name
        )
    }

    /// Parse one line; anything but exactly five whitespace-separated fields is rejected
    pub fn parse_line(line: &str) -> Option<HighScoreEntry> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [label, secs, "seconds", "by", name] = fields.as_slice() else {
            return None;
        };
        let difficulty = Difficulty::from_name(label.strip_suffix(':')?)?;
        let secs = secs.parse().ok()?;
        Some(HighScoreEntry {
            name: name.to_string(),
            secs,
            difficulty,
        })
    }
}

/// Best time per preset difficulty, kept sorted by difficulty rank then time
/// When bound to a file, every mutation is written straight back
#[derive(Debug, Default)]
pub struct HighScoreTable {
    entries: Vec<HighScoreEntry>,
    path: Option<PathBuf>,
}

impl HighScoreTable {
    /// A table that is never written anywhere
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the table from `path`; a missing or unreadable file yields an empty table
    /// that will still be saved back to `path`
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut table = HighScoreTable {
            entries: Vec::new(),
            path: None,
        };
        match read_scores(&path) {
            Ok(text) => table.merge_text(&text),
            Err(err) => warn!("{err}; starting with empty high scores"),
        }
        debug!(path = %path.display(), entries = table.entries.len(), "high scores loaded");
        table.path = Some(path);
        table
    }

    /// Fold every well-formed line of `text` into the table, skipping the rest
    pub fn merge_text(&mut self, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            match HighScoreEntry::parse_line(line) {
                Some(entry) => self.insert(entry),
                None => debug!(line, "skipping malformed high-score line"),
            }
        }
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self, difficulty: &Difficulty) -> Option<&HighScoreEntry> {
        self.entries.iter().find(|e| &e.difficulty == difficulty)
    }

    /// Whether `secs` would take the top spot; ties keep the existing holder
    pub fn is_qualifying(&self, secs: u32, difficulty: &Difficulty) -> bool {
        if !difficulty.is_preset() {
            return false;
        }
        self.best(difficulty).is_none_or(|best| best.secs > secs)
    }

    /// Record a finished game; returns whether the table changed
    pub fn submit(&mut self, name: &str, secs: u32, difficulty: &Difficulty) -> bool {
        if !self.is_qualifying(secs, difficulty) {
            return false;
        }
        let name = normalize_name(name);
        info!(%difficulty, secs, name = %name, "new high score");
        self.insert(HighScoreEntry {
            name,
            secs,
            difficulty: difficulty.clone(),
        });
        self.flush();
        true
    }

    /// Drop every entry and persist the empty table
    pub fn reset(&mut self) {
        self.entries.clear();
        info!("high scores reset");
        self.flush();
    }

    /// Table text for display, or the placeholder when empty
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            EMPTY_TABLE_TEXT.to_string()
        } else {
            self.to_file_text()
        }
    }

    /// Table text as stored on disk (empty string for an empty table)
    pub fn to_file_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.line() + "\n")
            .collect()
    }

    fn insert(&mut self, entry: HighScoreEntry) {
        if !self.is_qualifying(entry.secs, &entry.difficulty) {
            return;
        }
        self.entries.retain(|e| e.difficulty != entry.difficulty);
        self.entries.push(entry);
        self.entries
            .sort_by_key(|e| (e.difficulty.rank(), e.secs));
    }

    fn flush(&self) {
        let Some(path) = &self.path else { return };
        if let Err(err) = write_scores(path, &self.to_file_text()) {
            warn!("{err}; high scores not saved");
        }
    }
}

/// Read the raw score file; a missing file reads as empty
/// Invalid UTF-8 is replaced rather than rejected, so only the damaged line is lost
pub fn read_scores(path: &Path) -> Result<String, ScoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ScoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn write_scores(path: &Path, text: &str) -> Result<(), ScoreError> {
    let wrap = |source| ScoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, text).map_err(wrap)
}

/// Names are a single token on disk
fn normalize_name(name: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        ANONYMOUS.to_string()
    } else {
        joined
    }
}
