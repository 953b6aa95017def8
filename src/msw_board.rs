// Minefield grid: mine placement, adjacency counts and per-cell transitions
// Win/loss bookkeeping lives in the session; the board only reports outcomes

use rand::Rng;
use rand::seq::index;

use crate::msw_difficulty::Difficulty;

/// A single cell on the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub mine: bool,     // Contains a mine
    pub revealed: bool, // Content has been exposed
    pub flagged: bool,  // Marked by the player
    pub adj: u8,        // Adjacent mine count (0-8), fixed after generation
}

/// What the view layer draws for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Covered,
    Flagged,
    Revealed(u8),
    Mine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Safe(u8),
    HitMine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Toggled(bool), // New flagged state
}

#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    mines: Vec<(usize, usize)>,
    revealed_safe: usize,
    detonated: Option<(usize, usize)>,
}

impl Board {
    /// Generate a fresh board, drawing exactly `mines` distinct cells
    /// Sampling is a partial Fisher-Yates shuffle over cell indices, so it
    /// terminates at any density
    pub fn generate_with<R: Rng + ?Sized>(difficulty: &Difficulty, rng: &mut R) -> Self {
        let (rows, cols) = (difficulty.rows(), difficulty.cols());
        let total = difficulty.total_spaces();
        let mines = index::sample(rng, total, difficulty.mines().min(total))
            .into_iter()
            .map(|i| (i / cols, i % cols))
            .collect::<Vec<_>>();
        Self::from_mines(rows, cols, &mines)
    }

    /// Build a board with mines at the given coordinates; duplicates collapse
    pub fn from_mines(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Self {
        assert!(rows > 0 && cols > 0, "board must not be empty");
        let mut board = Board {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
            mines: Vec::with_capacity(mines.len()),
            revealed_safe: 0,
            detonated: None,
        };
        for &(r, c) in mines {
            let idx = board.index(r, c);
            if !board.cells[idx].mine {
                board.cells[idx].mine = true;
                board.mines.push((r, c));
            }
        }
        // every mine bumps its non-mine neighbours
        for m in 0..board.mines.len() {
            let (r, c) = board.mines[m];
            for (nr, nc) in board.neighbors(r, c) {
                let nidx = nr * cols + nc;
                if !board.cells[nidx].mine {
                    board.cells[nidx].adj += 1;
                }
            }
        }
        board
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    #[cfg(test)]
    pub fn mines(&self) -> &[(usize, usize)] {
        &self.mines
    }

    /// Safe cells revealed so far
    pub fn revealed_safe(&self) -> usize {
        self.revealed_safe
    }

    /// The mine whose reveal ended the game, if any
    pub fn detonated(&self) -> Option<(usize, usize)> {
        self.detonated
    }

    /// Convert (row, col) to a flat index; out-of-range coordinates are a caller bug
    pub fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} board",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[self.index(row, col)]
    }

    pub fn view(&self, row: usize, col: usize) -> CellView {
        let cell = self.cell(row, col);
        match (cell.revealed, cell.mine, cell.flagged) {
            (true, true, _) => CellView::Mine,
            (true, false, _) => CellView::Revealed(cell.adj),
            (false, _, true) => CellView::Flagged,
            (false, _, false) => CellView::Covered,
        }
    }

    /// In-bounds neighbours of a cell (3 at corners, 5 on edges, 8 inside)
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (rows, cols) = (self.rows, self.cols);
        let row_range = row.saturating_sub(1)..=(row + 1).min(rows - 1);
        row_range.flat_map(move |r| {
            (col.saturating_sub(1)..=(col + 1).min(cols - 1))
                .filter(move |&c| (r, c) != (row, col))
                .map(move |c| (r, c))
        })
    }

    /// Reveal one cell; no neighbouring cells are opened
    pub fn reveal(&mut self, row: usize, col: usize) -> RevealOutcome {
        let idx = self.index(row, col);
        let cell = &mut self.cells[idx];
        if cell.revealed || cell.flagged {
            return RevealOutcome::NoChange;
        }
        cell.revealed = true;
        if cell.mine {
            self.detonated = Some((row, col));
            RevealOutcome::HitMine
        } else {
            self.revealed_safe += 1;
            RevealOutcome::Safe(cell.adj)
        }
    }

    /// Flip the flag on a covered cell
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> FlagOutcome {
        let idx = self.index(row, col);
        let cell = &mut self.cells[idx];
        if cell.revealed {
            return FlagOutcome::NoChange;
        }
        cell.flagged = !cell.flagged;
        FlagOutcome::Toggled(cell.flagged)
    }

    /// Expose every mine for the end-of-game display
    pub fn reveal_all_mines(&mut self) {
        for &(r, c) in &self.mines {
            self.cells[r * self.cols + c].revealed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn brute_force_adj(board: &Board, row: usize, col: usize) -> u8 {
        let mut n = 0;
        for dr in -1i64..=1 {
            for dc in -1i64..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (r, c) = (row as i64 + dr, col as i64 + dc);
                if r >= 0 && c >= 0 && board.contains(r as usize, c as usize) {
                    if board.cell(r as usize, c as usize).mine {
                        n += 1;
                    }
                }
            }
        }
        n
    }

    #[test]
    fn generated_boards_hold_exact_mine_count_and_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        for d in Difficulty::PRESETS {
            for _ in 0..20 {
                let board = Board::generate_with(&d, &mut rng);
                let mine_cells = (0..d.rows())
                    .flat_map(|r| (0..d.cols()).map(move |c| (r, c)))
                    .filter(|&(r, c)| board.cell(r, c).mine)
                    .count();
                assert_eq!(mine_cells, d.mines());
                assert_eq!(board.mine_count(), d.mines());
                for r in 0..d.rows() {
                    for c in 0..d.cols() {
                        if !board.cell(r, c).mine {
                            assert_eq!(board.cell(r, c).adj, brute_force_adj(&board, r, c));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn thread_rng_generation_places_every_mine() {
        let board = Board::generate_with(&Difficulty::INTERMEDIATE, &mut rand::thread_rng());
        assert_eq!(board.mine_count(), 40);
        assert_eq!(board.revealed_safe(), 0);
        assert!(board.detonated().is_none());
    }

    #[test]
    fn dense_board_generation_terminates() {
        let d = Difficulty::custom(4, 4, 15).unwrap();
        let board = Board::generate_with(&d, &mut StdRng::seed_from_u64(1));
        assert_eq!(board.mine_count(), 15);
        let safe = (0..4)
            .flat_map(|r| (0..4).map(move |c| (r, c)))
            .filter(|&(r, c)| !board.cell(r, c).mine)
            .count();
        assert_eq!(safe, 1);
    }

    #[test]
    fn neighbour_counts_at_corners_edges_and_centre() {
        let board = Board::from_mines(3, 3, &[]);
        assert_eq!(board.neighbors(0, 0).count(), 3);
        assert_eq!(board.neighbors(0, 1).count(), 5);
        assert_eq!(board.neighbors(1, 1).count(), 8);
        assert_eq!(board.neighbors(2, 2).count(), 3);
        let single = Board::from_mines(1, 1, &[]);
        assert_eq!(single.neighbors(0, 0).count(), 0);
    }

    #[test]
    fn fixture_layout_counts() {
        // 5x5 with mines at (1,1), (2,3), (3,3)
        let board = Board::from_mines(5, 5, &[(1, 1), (2, 3), (3, 3)]);
        assert_eq!(board.cell(0, 0).adj, 1);
        assert_eq!(board.cell(2, 2).adj, 3);
        assert_eq!(board.cell(3, 4).adj, 2);
        assert_eq!(board.cell(4, 0).adj, 0);
        // mines keep a zero count
        assert_eq!(board.cell(2, 3).adj, 0);
    }

    #[test]
    fn duplicate_mines_collapse() {
        let board = Board::from_mines(2, 2, &[(0, 0), (0, 0)]);
        assert_eq!(board.mine_count(), 1);
        assert_eq!(board.cell(1, 1).adj, 1);
    }

    #[test]
    fn reveal_is_single_cell_and_idempotent() {
        let mut board = Board::from_mines(3, 3, &[(2, 2)]);
        assert_eq!(board.reveal(0, 0), RevealOutcome::Safe(0));
        assert_eq!(board.view(0, 1), CellView::Covered);
        assert_eq!(board.reveal(0, 0), RevealOutcome::NoChange);
        assert_eq!(board.revealed_safe(), 1);
    }

    #[test]
    fn flags_block_reveal_and_revealed_cells_refuse_flags() {
        let mut board = Board::from_mines(2, 2, &[(0, 0)]);
        assert_eq!(board.toggle_flag(0, 0), FlagOutcome::Toggled(true));
        assert_eq!(board.view(0, 0), CellView::Flagged);
        assert_eq!(board.reveal(0, 0), RevealOutcome::NoChange);
        assert_eq!(board.toggle_flag(0, 0), FlagOutcome::Toggled(false));

        assert_eq!(board.reveal(1, 1), RevealOutcome::Safe(1));
        assert_eq!(board.toggle_flag(1, 1), FlagOutcome::NoChange);
        assert_eq!(board.view(1, 1), CellView::Revealed(1));
    }

    #[test]
    fn hitting_a_mine_records_detonation() {
        let mut board = Board::from_mines(2, 2, &[(1, 0), (0, 1)]);
        assert_eq!(board.reveal(1, 0), RevealOutcome::HitMine);
        assert_eq!(board.detonated(), Some((1, 0)));
        assert_eq!(board.revealed_safe(), 0);
        board.reveal_all_mines();
        assert_eq!(board.view(0, 1), CellView::Mine);
        assert_eq!(board.view(0, 0), CellView::Covered);
    }

    #[test]
    #[should_panic(expected = "outside 2x2 board")]
    fn out_of_range_coordinates_panic() {
        let board = Board::from_mines(2, 2, &[]);
        board.cell(2, 0);
    }
}
