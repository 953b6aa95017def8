// Board configurations: the three classic presets plus validated custom sizes
// Presets are ranked in menu order; the rank drives high-score ordering

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Named, immutable board configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Difficulty {
    name: Cow<'static, str>,
    rows: usize,
    cols: usize,
    mines: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("board must have at least one row and one column (got {rows}x{cols})")]
    EmptyBoard { rows: usize, cols: usize },
    #[error("board of {rows}x{cols} exceeds the {max_rows}x{max_cols} limit")]
    TooLarge {
        rows: usize,
        cols: usize,
        max_rows: usize,
        max_cols: usize,
    },
    #[error("mine count {mines} must be between 1 and {max}")]
    MineCount { mines: usize, max: usize },
}

impl Difficulty {
    pub const BEGINNER: Difficulty = Difficulty::preset("Beginner", 8, 8, 10);
    pub const INTERMEDIATE: Difficulty = Difficulty::preset("Intermediate", 16, 16, 40);
    pub const EXPERT: Difficulty = Difficulty::preset("Expert", 16, 32, 99);

    /// Presets in rank order
    pub const PRESETS: [Difficulty; 3] = [
        Difficulty::BEGINNER,
        Difficulty::INTERMEDIATE,
        Difficulty::EXPERT,
    ];

    /// Name used for any configuration that is not one of the presets
    pub const CUSTOM_NAME: &'static str = "Custom";

    /// Largest custom board that still fits a typical terminal
    pub const MAX_ROWS: usize = 24;
    pub const MAX_COLS: usize = 36;

    const fn preset(name: &'static str, rows: usize, cols: usize, mines: usize) -> Self {
        Difficulty {
            name: Cow::Borrowed(name),
            rows,
            cols,
            mines,
        }
    }

    /// Build a custom configuration, rejecting boards that cannot be played
    /// (at least one mine and at least one safe cell are required)
    pub fn custom(rows: usize, cols: usize, mines: usize) -> Result<Self, DifficultyError> {
        if rows == 0 || cols == 0 {
            return Err(DifficultyError::EmptyBoard { rows, cols });
        }
        if rows > Self::MAX_ROWS || cols > Self::MAX_COLS {
            return Err(DifficultyError::TooLarge {
                rows,
                cols,
                max_rows: Self::MAX_ROWS,
                max_cols: Self::MAX_COLS,
            });
        }
        let max = rows * cols - 1;
        if mines == 0 || mines > max {
            return Err(DifficultyError::MineCount { mines, max });
        }
        Ok(Difficulty {
            name: Cow::Borrowed(Self::CUSTOM_NAME),
            rows,
            cols,
            mines,
        })
    }

    /// Look up a preset by its display name (case-sensitive, as written to disk)
    pub fn from_name(name: &str) -> Option<Difficulty> {
        Self::PRESETS.into_iter().find(|d| d.name == name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mines(&self) -> usize {
        self.mines
    }

    pub fn total_spaces(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of safe reveals needed to win
    pub fn total_safe_clicks(&self) -> usize {
        self.total_spaces() - self.mines
    }

    /// Most flags that may be on the board at once
    pub fn flag_cap(&self) -> usize {
        self.mines + 99
    }

    /// Ordering key: presets by menu position, custom boards after all presets
    pub fn rank(&self) -> usize {
        Self::PRESETS
            .iter()
            .position(|p| p == self)
            .unwrap_or(Self::PRESETS.len())
    }

    pub fn is_preset(&self) -> bool {
        self.rank() < Self::PRESETS.len()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_expected_shapes() {
        let b = Difficulty::BEGINNER;
        assert_eq!((b.rows(), b.cols(), b.mines()), (8, 8, 10));
        assert_eq!(b.total_spaces(), 64);
        assert_eq!(b.total_safe_clicks(), 54);

        let e = Difficulty::EXPERT;
        assert_eq!((e.rows(), e.cols(), e.mines()), (16, 32, 99));
        assert_eq!(e.total_safe_clicks(), 512 - 99);
        assert_eq!(e.flag_cap(), 198);
    }

    #[test]
    fn rank_follows_menu_order() {
        assert_eq!(Difficulty::BEGINNER.rank(), 0);
        assert_eq!(Difficulty::INTERMEDIATE.rank(), 1);
        assert_eq!(Difficulty::EXPERT.rank(), 2);
        let custom = Difficulty::custom(5, 5, 3).unwrap();
        assert_eq!(custom.rank(), 3);
        assert!(!custom.is_preset());
    }

    #[test]
    fn custom_with_preset_shape_is_still_custom() {
        let lookalike = Difficulty::custom(8, 8, 10).unwrap();
        assert_ne!(lookalike, Difficulty::BEGINNER);
        assert_eq!(lookalike.name(), "Custom");
    }

    #[test]
    fn custom_rejects_unplayable_boards() {
        assert_eq!(
            Difficulty::custom(0, 4, 1),
            Err(DifficultyError::EmptyBoard { rows: 0, cols: 4 })
        );
        assert_eq!(
            Difficulty::custom(3, 3, 9),
            Err(DifficultyError::MineCount { mines: 9, max: 8 })
        );
        assert!(Difficulty::custom(3, 3, 0).is_err());
        assert!(Difficulty::custom(3, 3, 8).is_ok());
    }

    #[test]
    fn custom_rejects_oversized_boards() {
        assert!(Difficulty::custom(24, 36, 863).is_ok());
        assert_eq!(
            Difficulty::custom(25, 36, 10),
            Err(DifficultyError::TooLarge { rows: 25, cols: 36, max_rows: 24, max_cols: 36 })
        );
        assert!(matches!(
            Difficulty::custom(usize::MAX / 2, 3, 1),
            Err(DifficultyError::TooLarge { .. })
        ));
        assert!(matches!(
            Difficulty::custom(3, usize::MAX, 1),
            Err(DifficultyError::TooLarge { .. })
        ));
    }

    #[test]
    fn from_name_only_resolves_presets() {
        assert_eq!(Difficulty::from_name("Expert"), Some(Difficulty::EXPERT));
        assert_eq!(Difficulty::from_name("Custom"), None);
        assert_eq!(Difficulty::from_name("expert"), None);
    }
}
