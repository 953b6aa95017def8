// One playthrough: wraps a board, the mine counter, the clock and terminal state
// The view layer calls in with clicks and queries state back; nothing is pushed

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::msw_board::{Board, CellView, FlagOutcome, RevealOutcome};
use crate::msw_difficulty::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Won,
    Lost,
}

impl Status {
    pub fn is_over(self) -> bool {
        !matches!(self, Status::Ongoing)
    }
}

/// Which button the player used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Reveal, // primary / left
    Flag,   // secondary / right
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    NoChange,
    Revealed(u8),
    Flagged { flagged: bool, mines_left: isize },
    Lost,
    Won,
}

/// Header face, as on the classic smiley button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Smile,
    Pressed,
    Dead,
    Cool,
}

/// Elapsed-time tracker that can be paused and frozen
/// All methods take the current instant so callers (and tests) control time
#[derive(Debug, Clone)]
pub struct Stopwatch {
    running_since: Option<Instant>, // Some while the clock is counting
    banked: Duration,               // Time accumulated before the current run
    frozen: bool,                   // Game ended; pause/resume are ignored
}

impl Stopwatch {
    pub fn started_at(now: Instant) -> Self {
        Stopwatch {
            running_since: Some(now),
            banked: Duration::ZERO,
            frozen: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn pause_at(&mut self, now: Instant) {
        if let Some(t0) = self.running_since.take() {
            self.banked += now.saturating_duration_since(t0);
        }
    }

    pub fn resume_at(&mut self, now: Instant) {
        if !self.frozen && self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Stop for good
    pub fn freeze_at(&mut self, now: Instant) {
        self.pause_at(now);
        self.frozen = true;
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(t0) => self.banked + now.saturating_duration_since(t0),
            None => self.banked,
        }
    }
}

pub struct GameSession {
    difficulty: Difficulty,
    board: Board,
    flagged: usize,
    status: Status,
    clock: Stopwatch,
    lock_on_pause: bool, // Ignore clicks while the clock is paused
    rng: StdRng,
}

impl GameSession {
    /// Start a game with an entropy-seeded generator
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    /// Start a game whose layouts are reproducible from `seed`
    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, mut rng: StdRng) -> Self {
        let board = Board::generate_with(&difficulty, &mut rng);
        info!(difficulty = %difficulty, "new game");
        GameSession {
            difficulty,
            board,
            flagged: 0,
            status: Status::Ongoing,
            clock: Stopwatch::started_at(Instant::now()),
            lock_on_pause: false,
            rng,
        }
    }

    /// Start a game on a prepared board
    #[cfg(test)]
    pub fn from_board(difficulty: Difficulty, board: Board) -> Self {
        assert!(
            board.rows() == difficulty.rows() && board.cols() == difficulty.cols(),
            "board shape does not match difficulty"
        );
        GameSession {
            difficulty,
            board,
            flagged: 0,
            status: Status::Ongoing,
            clock: Stopwatch::started_at(Instant::now()),
            lock_on_pause: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// Throw away the current board and deal a new one
    pub fn new_game(&mut self, difficulty: Difficulty) {
        self.board = Board::generate_with(&difficulty, &mut self.rng);
        info!(difficulty = %difficulty, "new game");
        self.difficulty = difficulty;
        self.flagged = 0;
        self.status = Status::Ongoing;
        self.clock = Stopwatch::started_at(Instant::now());
    }

    pub fn set_lock_on_pause(&mut self, lock: bool) {
        self.lock_on_pause = lock;
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged
    }

    pub fn revealed_safe_count(&self) -> usize {
        self.board.revealed_safe()
    }

    /// Mines minus flags; negative when the player over-flags
    pub fn mines_left(&self) -> isize {
        self.difficulty.mines() as isize - self.flagged as isize
    }

    pub fn cell(&self, row: usize, col: usize) -> CellView {
        self.board.view(row, col)
    }

    pub fn face(&self, pressing: bool) -> Face {
        match self.status {
            Status::Won => Face::Cool,
            Status::Lost => Face::Dead,
            Status::Ongoing if pressing => Face::Pressed,
            Status::Ongoing => Face::Smile,
        }
    }

    pub fn click(&mut self, row: usize, col: usize, click: Click) -> ClickOutcome {
        if self.status.is_over() || (self.lock_on_pause && self.is_paused()) {
            return ClickOutcome::NoChange;
        }
        match click {
            Click::Flag => self.flag(row, col),
            Click::Reveal => self.reveal(row, col, Instant::now()),
        }
    }

    fn flag(&mut self, row: usize, col: usize) -> ClickOutcome {
        // placing a new flag is refused once the cap is reached
        let cell = self.board.cell(row, col);
        if !cell.revealed && !cell.flagged && self.flagged >= self.difficulty.flag_cap() {
            debug!(row, col, "flag cap reached");
            return ClickOutcome::NoChange;
        }
        match self.board.toggle_flag(row, col) {
            FlagOutcome::NoChange => ClickOutcome::NoChange,
            FlagOutcome::Toggled(flagged) => {
                if flagged {
                    self.flagged += 1;
                } else {
                    self.flagged -= 1;
                }
                ClickOutcome::Flagged {
                    flagged,
                    mines_left: self.mines_left(),
                }
            }
        }
    }

    fn reveal(&mut self, row: usize, col: usize, now: Instant) -> ClickOutcome {
        match self.board.reveal(row, col) {
            RevealOutcome::NoChange => ClickOutcome::NoChange,
            RevealOutcome::HitMine => {
                self.status = Status::Lost;
                self.board.reveal_all_mines();
                self.clock.freeze_at(now);
                info!(row, col, secs = self.elapsed_secs(), "mine hit, game lost");
                ClickOutcome::Lost
            }
            RevealOutcome::Safe(adj) => {
                if self.board.revealed_safe() == self.difficulty.total_safe_clicks() {
                    self.status = Status::Won;
                    self.clock.freeze_at(now);
                    info!(secs = self.elapsed_secs(), "board cleared, game won");
                    ClickOutcome::Won
                } else {
                    ClickOutcome::Revealed(adj)
                }
            }
        }
    }

    /// Suspend the clock; input is still accepted unless locking is enabled
    pub fn pause(&mut self) {
        self.clock.pause_at(Instant::now());
    }

    pub fn resume(&mut self) {
        if !self.status.is_over() {
            self.clock.resume_at(Instant::now());
        }
    }

    pub fn is_paused(&self) -> bool {
        !self.status.is_over() && !self.clock.is_running()
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed_at(Instant::now())
    }

    /// Whole seconds on the clock, as submitted to the high-score table
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed().as_secs().try_into().unwrap_or(u32::MAX)
    }
}

/// Three-character counter text: zero-padded, `-` for negatives, clamped to -99..=999
pub fn counter_digits(value: isize) -> String {
    let value = value.clamp(-99, 999);
    if value < 0 {
        format!("-{:02}", -value)
    } else {
        format!("{:03}", value)
    }
}
